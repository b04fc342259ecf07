// BgpSym: Symbolic Verification of BGP Route-Maps
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # AS-Path Regular Expressions
//!
//! Parser for the regular expressions used in AS-path access lists, and the Thompson construction
//! of the parsed expression into a nondeterministic automaton. The expressions operate on the
//! alphabet of decimal digits plus a single separator symbol. The following syntax is supported:
//!
//! - Concatenation, alternation `|` and grouping `( ... )`
//! - Repetition `*`, `+`, `?`, `{m}`, `{m,}` and `{m,n}`
//! - The wildcard `.`, and character classes like `[0-9]`, `[13_]` or `[^4]`
//! - `\W`, `\s`, `\D`, `_` and the space character for the separator, `\d` and `\w` for any digit
//! - `^` at the very beginning and `$` at the very end, both matching the separator

use super::{Symbol, SymbolSet, ALL_SYMBOLS, DIGITS, SEPARATOR};
use thiserror::Error;

/// Upper bound for the counted repetitions `{m,n}`.
pub const MAX_REPETITION: u32 = 64;

/// Errors while parsing a regular expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    /// The expression ended while more input was expected
    #[error("Unexpected end of the expression")]
    UnexpectedEnd,
    /// A character appeared at a position where it is not allowed
    #[error("Unexpected character {1:?} at position {0}")]
    UnexpectedChar(usize, char),
    /// A character which is not part of the AS-path alphabet
    #[error("Character {1:?} at position {0} is not part of the AS-path alphabet")]
    InvalidChar(usize, char),
    /// Escape sequence that is not supported
    #[error("Unsupported escape sequence \\{1} at position {0}")]
    UnsupportedEscape(usize, char),
    /// Anchor in the middle of the expression
    #[error("Anchor {1:?} at position {0} is only allowed at the start or the end")]
    MisplacedAnchor(usize, char),
    /// Malformed or too large repetition bound
    #[error("Invalid repetition bound starting at position {0}")]
    InvalidRepetition(usize),
    /// A parenthesis is not closed, or closed without being opened
    #[error("Unbalanced parenthesis at position {0}")]
    UnbalancedParenthesis(usize),
    /// A character class matching nothing
    #[error("Empty character class at position {0}")]
    EmptyClass(usize),
}

/// Abstract syntax tree of a parsed expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Ast {
    /// Matches the empty word
    Empty,
    /// Matches a single symbol of the set
    Set(SymbolSet),
    /// Sequence of expressions
    Concat(Vec<Ast>),
    /// Any of the expressions
    Alternation(Vec<Ast>),
    /// Repetition with an optional upper bound
    Repeat {
        inner: Box<Ast>,
        min: u32,
        max: Option<u32>,
    },
}

/// Parse the expression into its syntax tree.
pub(crate) fn parse(pattern: &str) -> Result<Ast, RegexError> {
    let mut parser = Parser { chars: pattern.chars().collect(), pos: 0 };
    let ast = parser.alternation()?;
    match parser.peek() {
        None => Ok(ast),
        Some(')') => Err(RegexError::UnbalancedParenthesis(parser.pos)),
        Some(c) => Err(RegexError::UnexpectedChar(parser.pos, c)),
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Result<char, RegexError> {
        let c = self.peek().ok_or(RegexError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(c)
    }

    fn alternation(&mut self) -> Result<Ast, RegexError> {
        let mut branches = vec![self.concat()?];
        while self.peek() == Some('|') {
            self.pos += 1;
            branches.push(self.concat()?);
        }
        Ok(if branches.len() == 1 { branches.remove(0) } else { Ast::Alternation(branches) })
    }

    fn concat(&mut self) -> Result<Ast, RegexError> {
        let mut items = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            items.push(self.repetition()?);
        }
        Ok(match items.len() {
            0 => Ast::Empty,
            1 => items.remove(0),
            _ => Ast::Concat(items),
        })
    }

    fn repetition(&mut self) -> Result<Ast, RegexError> {
        let mut ast = self.atom()?;
        loop {
            let start = self.pos;
            let (min, max) = match self.peek() {
                Some('*') => (0, None),
                Some('+') => (1, None),
                Some('?') => (0, Some(1)),
                Some('{') => {
                    self.pos += 1;
                    self.bounds(start)?
                }
                _ => break,
            };
            if self.pos == start {
                self.pos += 1;
            }
            ast = Ast::Repeat { inner: Box::new(ast), min, max };
        }
        Ok(ast)
    }

    fn number(&mut self) -> Option<u32> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect::<String>().parse().ok()
    }

    fn bounds(&mut self, start: usize) -> Result<(u32, Option<u32>), RegexError> {
        let err = RegexError::InvalidRepetition(start);
        let min = self.number().ok_or_else(|| err.clone())?;
        let max = match self.next().map_err(|_| err.clone())? {
            '}' => Some(min),
            ',' => {
                let max = self.number();
                if self.next().map_err(|_| err.clone())? != '}' {
                    return Err(err);
                }
                max
            }
            _ => return Err(err),
        };
        match max {
            Some(max) if max < min || max > MAX_REPETITION => Err(err),
            None if min > MAX_REPETITION => Err(err),
            _ => Ok((min, max)),
        }
    }

    fn atom(&mut self) -> Result<Ast, RegexError> {
        let pos = self.pos;
        let c = self.next()?;
        let set = match c {
            '(' => {
                let inner = self.alternation()?;
                if self.peek() != Some(')') {
                    return Err(RegexError::UnbalancedParenthesis(pos));
                }
                self.pos += 1;
                return Ok(inner);
            }
            '[' => self.class(pos)?,
            '\\' => self.escape(pos)?,
            '.' => ALL_SYMBOLS,
            '_' | ' ' => symbol(SEPARATOR),
            '0'..='9' => symbol(c as Symbol - b'0'),
            '^' if pos == 0 => symbol(SEPARATOR),
            '$' if pos + 1 == self.chars.len() => symbol(SEPARATOR),
            '^' | '$' => return Err(RegexError::MisplacedAnchor(pos, c)),
            '*' | '+' | '?' | '{' | '|' | ')' => return Err(RegexError::UnexpectedChar(pos, c)),
            _ => return Err(RegexError::InvalidChar(pos, c)),
        };
        Ok(Ast::Set(set))
    }

    fn escape(&mut self, pos: usize) -> Result<SymbolSet, RegexError> {
        match self.next()? {
            'W' | 's' | 'D' => Ok(symbol(SEPARATOR)),
            'w' | 'd' => Ok(DIGITS),
            c if "\\.*+?()[]{}|^$".contains(c) => Err(RegexError::InvalidChar(pos + 1, c)),
            c => Err(RegexError::UnsupportedEscape(pos, c)),
        }
    }

    fn class(&mut self, start: usize) -> Result<SymbolSet, RegexError> {
        let negated = if self.peek() == Some('^') {
            self.pos += 1;
            true
        } else {
            false
        };
        let mut set: SymbolSet = 0;
        loop {
            let pos = self.pos;
            match self.next()? {
                ']' => break,
                '\\' => set |= self.escape(pos)?,
                '_' | ' ' => set |= symbol(SEPARATOR),
                c @ '0'..='9' => {
                    if self.peek() == Some('-') && self.chars.get(self.pos + 1) != Some(&']') {
                        self.pos += 1;
                        let end = self.next()?;
                        if !end.is_ascii_digit() || end < c {
                            return Err(RegexError::UnexpectedChar(self.pos - 1, end));
                        }
                        for d in (c as u8)..=(end as u8) {
                            set |= symbol(d - b'0');
                        }
                    } else {
                        set |= symbol(c as Symbol - b'0');
                    }
                }
                c => return Err(RegexError::InvalidChar(pos, c)),
            }
        }
        if negated {
            set = ALL_SYMBOLS & !set;
        }
        if set == 0 {
            return Err(RegexError::EmptyClass(start));
        }
        Ok(set)
    }
}

fn symbol(s: Symbol) -> SymbolSet {
    1 << s
}

/// Nondeterministic automaton with epsilon transitions
#[derive(Debug, Clone, Default)]
pub(crate) struct Nfa {
    pub(crate) states: Vec<NfaState>,
    pub(crate) start: usize,
    pub(crate) accept: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NfaState {
    pub(crate) epsilon: Vec<usize>,
    pub(crate) edges: Vec<(SymbolSet, usize)>,
}

impl Nfa {
    /// Thompson construction of the syntax tree.
    pub(crate) fn compile(ast: &Ast) -> Self {
        let mut nfa = Self::default();
        let (start, accept) = nfa.fragment(ast);
        nfa.start = start;
        nfa.accept = accept;
        nfa
    }

    fn add_state(&mut self) -> usize {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    fn epsilon(&mut self, from: usize, to: usize) {
        self.states[from].epsilon.push(to);
    }

    /// Build the fragment of the expression, returning its entry and exit state.
    fn fragment(&mut self, ast: &Ast) -> (usize, usize) {
        match ast {
            Ast::Empty => {
                let s = self.add_state();
                (s, s)
            }
            Ast::Set(set) => {
                let s = self.add_state();
                let e = self.add_state();
                self.states[s].edges.push((*set, e));
                (s, e)
            }
            Ast::Concat(items) => {
                let start = self.add_state();
                let mut cur = start;
                for item in items {
                    let (a, b) = self.fragment(item);
                    self.epsilon(cur, a);
                    cur = b;
                }
                (start, cur)
            }
            Ast::Alternation(branches) => {
                let s = self.add_state();
                let e = self.add_state();
                for branch in branches {
                    let (a, b) = self.fragment(branch);
                    self.epsilon(s, a);
                    self.epsilon(b, e);
                }
                (s, e)
            }
            Ast::Repeat { inner, min, max } => {
                let start = self.add_state();
                let mut cur = start;
                for _ in 0..*min {
                    let (a, b) = self.fragment(inner);
                    self.epsilon(cur, a);
                    cur = b;
                }
                let end = self.add_state();
                match max {
                    None => {
                        let (a, b) = self.fragment(inner);
                        self.epsilon(cur, a);
                        self.epsilon(b, a);
                        self.epsilon(b, end);
                    }
                    Some(max) => {
                        for _ in *min..*max {
                            let (a, b) = self.fragment(inner);
                            self.epsilon(cur, end);
                            self.epsilon(cur, a);
                            cur = b;
                        }
                    }
                }
                self.epsilon(cur, end);
                (start, end)
            }
        }
    }

    /// Sorted set of states reachable from the seeds using only epsilon transitions.
    pub(crate) fn epsilon_closure(&self, seeds: Vec<usize>) -> Vec<usize> {
        let mut visited = vec![false; self.states.len()];
        let mut stack = seeds;
        let mut closure = Vec::new();
        while let Some(s) = stack.pop() {
            if visited[s] {
                continue;
            }
            visited[s] = true;
            closure.push(s);
            stack.extend(self.states[s].epsilon.iter().copied());
        }
        closure.sort_unstable();
        closure
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_atoms() {
        assert_eq!(parse("3"), Ok(Ast::Set(1 << 3)));
        assert_eq!(parse("_"), Ok(Ast::Set(1 << SEPARATOR)));
        assert_eq!(parse("\\W"), Ok(Ast::Set(1 << SEPARATOR)));
        assert_eq!(parse("\\d"), Ok(Ast::Set(DIGITS)));
        assert_eq!(parse("."), Ok(Ast::Set(ALL_SYMBOLS)));
        assert_eq!(parse(""), Ok(Ast::Empty));
    }

    #[test]
    fn parse_classes() {
        assert_eq!(parse("[1-3]"), Ok(Ast::Set(0b1110)));
        assert_eq!(parse("[^0-9]"), Ok(Ast::Set(1 << SEPARATOR)));
        assert_eq!(parse("[^0-9_]"), Err(RegexError::EmptyClass(0)));
        assert_eq!(parse("[12"), Err(RegexError::UnexpectedEnd));
    }

    #[test]
    fn parse_repetitions() {
        assert_eq!(
            parse("1{2,3}"),
            Ok(Ast::Repeat { inner: Box::new(Ast::Set(1 << 1)), min: 2, max: Some(3) })
        );
        assert_eq!(
            parse("1{2,}"),
            Ok(Ast::Repeat { inner: Box::new(Ast::Set(1 << 1)), min: 2, max: None })
        );
        assert_eq!(parse("1{3,2}"), Err(RegexError::InvalidRepetition(1)));
        assert_eq!(parse("1{a}"), Err(RegexError::InvalidRepetition(1)));
        assert_eq!(parse("*1"), Err(RegexError::UnexpectedChar(0, '*')));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse("(12"), Err(RegexError::UnbalancedParenthesis(0)));
        assert_eq!(parse("12)"), Err(RegexError::UnbalancedParenthesis(2)));
        assert_eq!(parse("1^2"), Err(RegexError::MisplacedAnchor(1, '^')));
        assert_eq!(parse("1$2"), Err(RegexError::MisplacedAnchor(1, '$')));
        assert_eq!(parse("a"), Err(RegexError::InvalidChar(0, 'a')));
        assert_eq!(parse("\\x"), Err(RegexError::UnsupportedEscape(0, 'x')));
    }
}
