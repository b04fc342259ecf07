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

//! # BGP Communities
//!
//! Communities are drawn from a finite, network-wide [`CommunityUniverse`]. A [`CommunitySet`]
//! stores, for every tag of the universe, whether the tag must be present, must be absent, or is
//! unconstrained.

use crate::netsim::{FieldError, RouteMapError};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A standard BGP community `asn:value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Community {
    /// AS number part
    pub asn: u16,
    /// Value part
    pub value: u16,
}

impl Community {
    /// Create a new community
    pub fn new(asn: u16, value: u16) -> Self {
        Self { asn, value }
    }
}

impl From<(u16, u16)> for Community {
    fn from((asn, value): (u16, u16)) -> Self {
        Self { asn, value }
    }
}

impl FromStr for Community {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || FieldError::InvalidCommunity(s.to_string());
        let mut parts = s.trim().splitn(2, ':');
        let asn = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
        let value = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
        Ok(Self { asn, value })
    }
}

impl fmt::Display for Community {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.asn, self.value)
    }
}

/// Ordered set of all communities known in the network. The order in which the tags are given is
/// kept, and every [`CommunitySet`] stores its constraints in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommunityUniverse {
    tags: Vec<Community>,
    indices: HashMap<Community, usize>,
}

impl CommunityUniverse {
    /// Create a universe from the given tags. Repeated tags keep their first position.
    pub fn new<I: IntoIterator<Item = Community>>(tags: I) -> Self {
        let mut universe = Self::default();
        for tag in tags {
            if !universe.indices.contains_key(&tag) {
                universe.indices.insert(tag, universe.tags.len());
                universe.tags.push(tag);
            }
        }
        universe
    }

    /// Create a universe from tags in their textual form `asn:value`.
    pub fn parse<I, S>(tags: I) -> Result<Self, FieldError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags = tags.into_iter().map(|t| t.as_ref().parse()).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(tags))
    }

    /// Position of the tag in the universe.
    pub fn index_of(&self, tag: &Community) -> Option<usize> {
        self.indices.get(tag).copied()
    }

    /// Returns `true` if the tag is part of the universe.
    pub fn contains(&self, tag: &Community) -> bool {
        self.index_of(tag).is_some()
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if the universe has no tags
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate over all tags in the order of the universe
    pub fn iter(&self) -> std::slice::Iter<'_, Community> {
        self.tags.iter()
    }
}

/// Constraint on a single community tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagState {
    /// The tag may or may not be attached
    Unconstrained,
    /// The tag is attached
    Present,
    /// The tag is not attached
    Absent,
    /// Contradicting constraints
    Impossible,
}

impl TagState {
    /// Conjunction of both constraints
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Unconstrained, x) | (x, Self::Unconstrained) => x,
            (a, b) if a == b => a,
            _ => Self::Impossible,
        }
    }
}

/// Symbolic set of community tags attached to an announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunitySet {
    universe: Arc<CommunityUniverse>,
    state: Vec<TagState>,
}

impl CommunitySet {
    /// Set without any constraint.
    pub fn new(universe: Arc<CommunityUniverse>) -> Self {
        let state = vec![TagState::Unconstrained; universe.len()];
        Self { universe, state }
    }

    /// Returns the universe of this set.
    pub fn universe(&self) -> &Arc<CommunityUniverse> {
        &self.universe
    }

    /// Returns the constraint on the tag, or `None` if the tag is not in the universe.
    pub fn state(&self, tag: &Community) -> Option<TagState> {
        self.universe.index_of(tag).map(|i| self.state[i])
    }

    fn indices(&self, tags: &[Community]) -> Result<Vec<usize>, RouteMapError> {
        tags.iter()
            .map(|t| self.universe.index_of(t).ok_or(RouteMapError::UnknownCommunity(*t)))
            .collect()
    }

    /// Conjoin the requirement that all `tags` are present. Returns `None` if the result is empty,
    /// which happens if one of the tags is already known to be absent.
    pub fn match_all(&self, tags: &[Community]) -> Result<Option<Self>, RouteMapError> {
        let mut result = self.clone();
        for i in self.indices(tags)? {
            result.state[i] = result.state[i].and(TagState::Present);
            if result.state[i] == TagState::Impossible {
                return Ok(None);
            }
        }
        Ok(Some(result))
    }

    /// Returns `true` if all `tags` are known to be present.
    pub fn requires_all(&self, tags: &[Community]) -> bool {
        tags.iter().all(|t| self.state(t) == Some(TagState::Present))
    }

    /// Attach all `tags`, overwriting previous constraints on them.
    pub fn set_all(&mut self, tags: &[Community]) -> Result<(), RouteMapError> {
        for i in self.indices(tags)? {
            self.state[i] = TagState::Present;
        }
        Ok(())
    }

    /// Require the tag to be absent.
    pub fn exclude(&mut self, tag: &Community) -> Result<(), RouteMapError> {
        let i = self.universe.index_of(tag).ok_or(RouteMapError::UnknownCommunity(*tag))?;
        self.state[i] = self.state[i].and(TagState::Absent);
        Ok(())
    }

    /// Returns `true` if the set cannot be satisfied.
    pub fn is_empty(&self) -> bool {
        self.state.iter().any(|s| *s == TagState::Impossible)
    }

    /// Iterate over all tags that are known to be present.
    pub fn present(&self) -> impl Iterator<Item = &Community> + '_ {
        self.with_state(TagState::Present)
    }

    /// Iterate over all tags that are known to be absent.
    pub fn absent(&self) -> impl Iterator<Item = &Community> + '_ {
        self.with_state(TagState::Absent)
    }

    fn with_state(&self, state: TagState) -> impl Iterator<Item = &Community> + '_ {
        self.universe.iter().zip(self.state.iter()).filter(move |(_, s)| **s == state).map(|(t, _)| t)
    }

    /// Returns `true` if the concrete set of tags satisfies all constraints.
    pub fn accepts(&self, tags: &[Community]) -> bool {
        self.universe.iter().zip(self.state.iter()).all(|(t, s)| match s {
            TagState::Unconstrained => true,
            TagState::Present => tags.contains(t),
            TagState::Absent => !tags.contains(t),
            TagState::Impossible => false,
        })
    }
}

impl fmt::Display for CommunitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "<empty>");
        }
        let parts: Vec<String> = self
            .present()
            .map(|t| t.to_string())
            .chain(self.absent().map(|t| format!("!{}", t)))
            .collect();
        if parts.is_empty() {
            write!(f, "*")
        } else {
            write!(f, "{{{}}}", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn universe() -> Arc<CommunityUniverse> {
        Arc::new(CommunityUniverse::parse(&["16:2", "16:1", "16:3", "16:1"]).unwrap())
    }

    #[test]
    fn universe_keeps_order() {
        let u = universe();
        assert_eq!(u.len(), 3);
        assert_eq!(u.iter().cloned().collect::<Vec<_>>(), vec![
            Community::new(16, 2),
            Community::new(16, 1),
            Community::new(16, 3)
        ]);
        assert_eq!(u.index_of(&Community::new(16, 2)), Some(0));
        assert_eq!(u.index_of(&Community::new(16, 1)), Some(1));
        assert_eq!(u.index_of(&Community::new(16, 3)), Some(2));
        assert_eq!(u.index_of(&Community::new(16, 4)), None);
        assert!(CommunityUniverse::parse(&["16"]).is_err());
        assert!(CommunityUniverse::parse(&["16:x"]).is_err());
    }

    #[test]
    fn tag_state_conjunction() {
        use TagState::*;
        assert_eq!(Unconstrained.and(Present), Present);
        assert_eq!(Absent.and(Unconstrained), Absent);
        assert_eq!(Present.and(Present), Present);
        assert_eq!(Present.and(Absent), Impossible);
        assert_eq!(Impossible.and(Unconstrained), Impossible);
    }

    #[test]
    fn match_and_exclude() {
        let c1 = Community::new(16, 1);
        let c2 = Community::new(16, 2);
        let mut set = CommunitySet::new(universe());
        let matched = set.match_all(&[c1, c2]).unwrap().unwrap();
        assert!(matched.requires_all(&[c1, c2]));
        assert!(!set.requires_all(&[c1]));
        assert_eq!(matched.to_string(), "{16:2, 16:1}");

        set.exclude(&c1).unwrap();
        assert_eq!(set.match_all(&[c1, c2]).unwrap(), None);
        assert_eq!(set.to_string(), "{!16:1}");
        assert!(set.accepts(&[c2]));
        assert!(!set.accepts(&[c1]));

        set.set_all(&[c1]).unwrap();
        assert_eq!(set.state(&c1), Some(TagState::Present));
    }

    #[test]
    fn unknown_community() {
        let set = CommunitySet::new(universe());
        let c = Community::new(17, 1);
        assert_eq!(set.match_all(&[c]), Err(RouteMapError::UnknownCommunity(c)));
    }
}
