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

//! # Deterministic Finite Automata
//!
//! Automata over the AS-path alphabet, consisting of the ten decimal digits and the separator
//! symbol. An AS path `[3, 45]` is written as the word ` 3 45 `, with the separator on both ends
//! and between every pair of AS numbers. All automata are complete: every state has a transition
//! for every symbol, and missing transitions lead to a non-accepting sink.
//!
//! Automata are built from regular expressions (see [`regex`]), and closed under intersection and
//! difference. Every operation returns a minimal automaton.

pub mod regex;

pub use regex::RegexError;

use std::collections::{HashMap, HashSet, VecDeque};

/// A single symbol of the alphabet. Digits are represented by their value.
pub type Symbol = u8;
/// Set of symbols, represented as a bitmask
pub type SymbolSet = u16;

/// Number of symbols in the alphabet
pub const ALPHABET_SIZE: usize = 11;
/// Symbol separating two AS numbers
pub const SEPARATOR: Symbol = 10;
/// Set containing all ten digits
pub const DIGITS: SymbolSet = 0x03ff;
/// Set containing all symbols
pub const ALL_SYMBOLS: SymbolSet = 0x07ff;

type Row = [usize; ALPHABET_SIZE];

/// Complete deterministic finite automaton over the AS-path alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    start: usize,
    accepting: Vec<bool>,
    transitions: Vec<Row>,
}

impl Dfa {
    /// Build the minimal automaton of the regular expression.
    pub fn from_regex(pattern: &str) -> Result<Self, RegexError> {
        let ast = regex::parse(pattern)?;
        let nfa = regex::Nfa::compile(&ast);
        Ok(Self::from_nfa(&nfa).minimize())
    }

    /// Build an automaton from its transition table. Every transition must point to a valid state.
    pub(crate) fn from_table(start: usize, accepting: Vec<bool>, transitions: Vec<Row>) -> Self {
        Self { start, accepting, transitions }.minimize()
    }

    /// Automaton accepting every word.
    pub fn universal() -> Self {
        Self { start: 0, accepting: vec![true], transitions: vec![[0; ALPHABET_SIZE]] }
    }

    /// Automaton accepting no word at all.
    pub fn empty() -> Self {
        Self { start: 0, accepting: vec![false], transitions: vec![[0; ALPHABET_SIZE]] }
    }

    /// Number of states, including the sink state.
    pub fn num_states(&self) -> usize {
        self.transitions.len()
    }

    /// Subset construction
    fn from_nfa(nfa: &regex::Nfa) -> Self {
        let start = nfa.epsilon_closure(vec![nfa.start]);
        let mut index: HashMap<Vec<usize>, usize> = HashMap::new();
        index.insert(start.clone(), 0);
        let mut sets = vec![start];
        let mut accepting = Vec::new();
        let mut transitions = Vec::new();

        let mut i = 0;
        while i < sets.len() {
            let set = sets[i].clone();
            accepting.push(set.binary_search(&nfa.accept).is_ok());
            let mut row = [0; ALPHABET_SIZE];
            for (sym, target) in row.iter_mut().enumerate() {
                let moved: Vec<usize> = set
                    .iter()
                    .flat_map(|s| nfa.states[*s].edges.iter())
                    .filter(|(mask, _)| mask & (1 << sym) != 0)
                    .map(|(_, t)| *t)
                    .collect();
                let closure = nfa.epsilon_closure(moved);
                *target = match index.get(&closure) {
                    Some(id) => *id,
                    None => {
                        let id = sets.len();
                        index.insert(closure.clone(), id);
                        sets.push(closure);
                        id
                    }
                };
            }
            transitions.push(row);
            i += 1;
        }

        Self { start: 0, accepting, transitions }
    }

    /// States reachable from the start, in breadth-first order (the start state comes first).
    fn reachable(&self) -> Vec<usize> {
        let mut visited = vec![false; self.transitions.len()];
        let mut order = vec![self.start];
        visited[self.start] = true;
        let mut i = 0;
        while i < order.len() {
            for &t in self.transitions[order[i]].iter() {
                if !visited[t] {
                    visited[t] = true;
                    order.push(t);
                }
            }
            i += 1;
        }
        order
    }

    /// Remove unreachable states and merge equivalent ones (Moore's partition refinement).
    fn minimize(self) -> Self {
        let reachable = self.reachable();
        let mut renumber = vec![0; self.transitions.len()];
        for (new, old) in reachable.iter().enumerate() {
            renumber[*old] = new;
        }
        let transitions: Vec<Row> = reachable
            .iter()
            .map(|old| {
                let mut row = self.transitions[*old];
                row.iter_mut().for_each(|t| *t = renumber[*t]);
                row
            })
            .collect();
        let accepting: Vec<bool> = reachable.iter().map(|old| self.accepting[*old]).collect();

        let mut class: Vec<usize> = accepting.iter().map(|a| *a as usize).collect();
        let mut num_classes = class.iter().collect::<HashSet<_>>().len();
        loop {
            let mut signatures: HashMap<(usize, Row), usize> = HashMap::new();
            let mut next = Vec::with_capacity(class.len());
            for (s, row) in transitions.iter().enumerate() {
                let mut sig = [0; ALPHABET_SIZE];
                sig.iter_mut().zip(row.iter()).for_each(|(c, t)| *c = class[*t]);
                let fresh = signatures.len();
                next.push(*signatures.entry((class[s], sig)).or_insert(fresh));
            }
            class = next;
            // refinement only ever splits classes
            if signatures.len() == num_classes {
                break;
            }
            num_classes = signatures.len();
        }

        let mut min_transitions = vec![[0; ALPHABET_SIZE]; num_classes];
        let mut min_accepting = vec![false; num_classes];
        for (s, row) in transitions.iter().enumerate() {
            let c = class[s];
            min_accepting[c] = accepting[s];
            for (sym, t) in row.iter().enumerate() {
                min_transitions[c][sym] = class[*t];
            }
        }
        Self { start: class[0], accepting: min_accepting, transitions: min_transitions }
    }

    /// Product construction, restricted to the reachable pairs of states.
    fn product(&self, other: &Self, accept: impl Fn(bool, bool) -> bool) -> Self {
        let mut index: HashMap<(usize, usize), usize> = HashMap::new();
        index.insert((self.start, other.start), 0);
        let mut pairs = vec![(self.start, other.start)];
        let mut accepting = Vec::new();
        let mut transitions = Vec::new();

        let mut i = 0;
        while i < pairs.len() {
            let (a, b) = pairs[i];
            accepting.push(accept(self.accepting[a], other.accepting[b]));
            let mut row = [0; ALPHABET_SIZE];
            for (sym, target) in row.iter_mut().enumerate() {
                let pair = (self.transitions[a][sym], other.transitions[b][sym]);
                *target = match index.get(&pair) {
                    Some(id) => *id,
                    None => {
                        let id = pairs.len();
                        index.insert(pair, id);
                        pairs.push(pair);
                        id
                    }
                };
            }
            transitions.push(row);
            i += 1;
        }

        Self { start: 0, accepting, transitions }
    }

    /// Automaton accepting the words accepted by both automata.
    pub fn intersect(&self, other: &Self) -> Self {
        self.product(other, |a, b| a && b).minimize()
    }

    /// Automaton accepting the words accepted by `self`, but not by `other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.product(other, |a, b| a && !b).minimize()
    }

    /// Automaton accepting the words accepted by any of the two automata.
    pub fn union(&self, other: &Self) -> Self {
        self.product(other, |a, b| a || b).minimize()
    }

    /// Returns `true` if the automaton accepts no word.
    pub fn is_empty(&self) -> bool {
        self.reachable().into_iter().all(|s| !self.accepting[s])
    }

    /// Returns `true` if there exists no word accepted by both automata.
    pub fn is_disjoint_from(&self, other: &Self) -> bool {
        self.product(other, |a, b| a && b).is_empty()
    }

    /// Returns `true` if every word accepted by `other` is also accepted by `self`.
    pub fn is_superset_of(&self, other: &Self) -> bool {
        other.product(self, |a, b| a && !b).is_empty()
    }

    /// Returns `true` if both automata accept the same language.
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.product(other, |a, b| a != b).is_empty()
    }

    /// Returns `true` if the word is accepted.
    pub fn accepts(&self, word: &[Symbol]) -> bool {
        let mut state = self.start;
        for sym in word {
            match self.transitions[state].get(*sym as usize) {
                Some(next) => state = *next,
                None => return false,
            }
        }
        self.accepting[state]
    }

    /// Automaton accepting the concatenation of `word` with every word accepted by `self`.
    pub fn prepend(&self, word: &[Symbol]) -> Self {
        if word.is_empty() {
            return self.clone();
        }
        let offset = self.transitions.len();
        let sink = offset + word.len();
        let mut transitions = self.transitions.clone();
        let mut accepting = self.accepting.clone();
        for (i, sym) in word.iter().enumerate() {
            let mut row = [sink; ALPHABET_SIZE];
            row[*sym as usize] = if i + 1 == word.len() { self.start } else { offset + i + 1 };
            transitions.push(row);
            accepting.push(false);
        }
        transitions.push([sink; ALPHABET_SIZE]);
        accepting.push(false);
        Self { start: offset, accepting, transitions }.minimize()
    }

    /// One of the shortest words accepted by the automaton, or `None` if it is empty.
    pub fn shortest_word(&self) -> Option<Vec<Symbol>> {
        let mut parent: Vec<Option<(usize, Symbol)>> = vec![None; self.transitions.len()];
        let mut visited = vec![false; self.transitions.len()];
        let mut queue = VecDeque::new();
        visited[self.start] = true;
        queue.push_back(self.start);
        while let Some(state) = queue.pop_front() {
            if self.accepting[state] {
                let mut word = Vec::new();
                let mut cur = state;
                while let Some((prev, sym)) = parent[cur] {
                    word.push(sym);
                    cur = prev;
                }
                word.reverse();
                return Some(word);
            }
            for (sym, t) in self.transitions[state].iter().enumerate() {
                if !visited[*t] {
                    visited[*t] = true;
                    parent[*t] = Some((state, sym as Symbol));
                    queue.push_back(*t);
                }
            }
        }
        None
    }
}
