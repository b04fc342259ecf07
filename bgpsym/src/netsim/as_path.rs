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

//! # Symbolic AS Paths
//!
//! An [`AsPathSet`] is a regular language of AS paths. The path `[3, 45]` is written as the word
//! ` 3 45 ` over the digits and the separator, and the set is stored as the minimal automaton
//! accepting all such words. Regular expressions in the style of `ip as-path access-list` are
//! matched against the entire word, and `\W` (or `_`) denotes the separator.

use crate::dfa::{Dfa, Symbol, ALPHABET_SIZE, SEPARATOR};
use crate::netsim::{AsId, FieldError};

use std::fmt;

/// Set of AS paths, represented as a regular language.
#[derive(Debug, Clone)]
pub struct AsPathSet {
    dfa: Dfa,
    expr: String,
}

impl AsPathSet {
    /// Set of all well-formed AS paths, including the empty path.
    pub fn any() -> Self {
        // start --sep--> boundary (accepting) --digit--> number --sep--> boundary
        let (start, boundary, number, sink) = (0, 1, 2, 3);
        let mut transitions = vec![[sink; ALPHABET_SIZE]; 4];
        transitions[start][SEPARATOR as usize] = boundary;
        for d in 0..10 {
            transitions[boundary][d] = number;
            transitions[number][d] = number;
        }
        transitions[number][SEPARATOR as usize] = boundary;
        Self {
            dfa: Dfa::from_table(start, vec![false, true, false, false], transitions),
            expr: String::from("any"),
        }
    }

    /// Set containing no path at all.
    pub fn empty() -> Self {
        Self { dfa: Dfa::empty(), expr: String::from("none") }
    }

    /// Set of all words matching the regular expression.
    ///
    /// ```
    /// # use bgpsym::netsim::as_path::AsPathSet;
    /// # use bgpsym::netsim::AsId;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let set = AsPathSet::from_regex(".*\\W3\\W.*")?;
    /// assert!(set.accepts(&[AsId(1), AsId(3)]));
    /// assert!(!set.accepts(&[AsId(1), AsId(33)]));
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_regex(pattern: &str) -> Result<Self, FieldError> {
        Ok(Self { dfa: Dfa::from_regex(pattern)?, expr: pattern.to_string() })
    }

    /// Returns the underlying automaton.
    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    /// Returns a textual description of how the set was constructed.
    pub fn description(&self) -> &str {
        &self.expr
    }

    /// Paths contained in both sets.
    pub fn intersect(&self, other: &Self) -> Self {
        let expr = if self.is_any_expr() {
            other.expr.clone()
        } else if other.is_any_expr() {
            self.expr.clone()
        } else {
            format!("({}) & ({})", self.expr, other.expr)
        };
        Self { dfa: self.dfa.intersect(&other.dfa), expr }
    }

    /// Paths contained in `self`, but not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        let expr = if self.is_any_expr() {
            format!("!({})", other.expr)
        } else {
            format!("({}) & !({})", self.expr, other.expr)
        };
        Self { dfa: self.dfa.difference(&other.dfa), expr }
    }

    fn is_any_expr(&self) -> bool {
        self.expr == "any"
    }

    /// Returns `true` if the set contains no path.
    pub fn is_empty(&self) -> bool {
        self.dfa.is_empty()
    }

    /// Returns `true` if no path is contained in both sets.
    pub fn is_disjoint_from(&self, other: &Self) -> bool {
        self.dfa.is_disjoint_from(&other.dfa)
    }

    /// Returns `true` if every path of `other` is also contained in `self`.
    pub fn is_superset_of(&self, other: &Self) -> bool {
        self.dfa.is_superset_of(&other.dfa)
    }

    /// Prepend the AS numbers to every path in the set. `prepend(&[AsId(1), AsId(2)])` turns the
    /// path `[3]` into `[1, 2, 3]`.
    pub fn prepend(&self, path: &[AsId]) -> Self {
        let mut word = as_path_word(path);
        // the separator in front of the existing path is already there
        word.pop();
        let expr = if path.is_empty() {
            self.expr.clone()
        } else {
            format!("prepend[{}]({})", format_path(path), self.expr)
        };
        Self { dfa: self.dfa.prepend(&word), expr }
    }

    /// Returns `true` if the concrete path is part of the set.
    pub fn accepts(&self, path: &[AsId]) -> bool {
        self.dfa.accepts(&as_path_word(path))
    }

    /// One of the shortest paths in the set, or `None` if the set is empty or only contains words
    /// that are no well-formed paths.
    pub fn example(&self) -> Option<Vec<AsId>> {
        let word = self.intersect(&Self::any()).dfa.shortest_word()?;
        parse_word(&word)
    }
}

impl PartialEq for AsPathSet {
    /// Two sets are equal if they contain the same paths.
    fn eq(&self, other: &Self) -> bool {
        self.dfa.is_equivalent(&other.dfa)
    }
}

impl fmt::Display for AsPathSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

/// Format a path as a space-separated list of AS numbers.
pub fn format_path(path: &[AsId]) -> String {
    path.iter().map(|a| a.0.to_string()).collect::<Vec<_>>().join(" ")
}

/// Word of the path, starting and ending with the separator.
pub(crate) fn as_path_word(path: &[AsId]) -> Vec<Symbol> {
    let mut word = vec![SEPARATOR];
    for asn in path {
        word.extend(asn.0.to_string().bytes().map(|b| b - b'0'));
        word.push(SEPARATOR);
    }
    word
}

fn parse_word(word: &[Symbol]) -> Option<Vec<AsId>> {
    let (first, rest) = word.split_first()?;
    if *first != SEPARATOR || rest.last().map(|s| *s != SEPARATOR).unwrap_or(false) {
        return None;
    }
    rest.split(|s| *s == SEPARATOR)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| chunk.iter().try_fold(0u32, |acc, d| acc.checked_mul(10)?.checked_add(*d as u32)))
        .map(|asn| asn.map(AsId))
        .collect()
}
