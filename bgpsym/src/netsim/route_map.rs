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

//! # Route-Maps
//!
//! This module contains the structures to build route-maps and to apply them to symbolic
//! announcements. A [`RouteMap`] is an ordered list of [`RouteMapItem`]s. Each item consists of
//! match statements, all of which must match, and actions that are applied to the matched part.
//! Applying a route-map on a symbolic announcement produces all announcements that may leave the
//! route-map, each with the part already handled by earlier items excluded.

use crate::netsim::announcement::{FieldPattern, FilterResult, RouteAnnouncement, RouteAnnouncementField};
use crate::netsim::as_path::{format_path, AsPathSet};
use crate::netsim::community::Community;
use crate::netsim::symbolic_field::{RangeType, SymbolicField};
use crate::netsim::{AsId, RouteMapError};

use log::*;
use std::fmt;
use std::net::Ipv4Addr;

/// State of a route-map item or match statement, which can either be allow or deny
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMapType {
    /// Matched routes are permitted
    Permit,
    /// Matched routes are dropped
    Deny,
}

impl RouteMapType {
    /// Returns `true` if the type is `Permit`
    pub fn is_permit(&self) -> bool {
        matches!(self, Self::Permit)
    }

    /// Returns `true` if the type is `Deny`
    pub fn is_deny(&self) -> bool {
        matches!(self, Self::Deny)
    }
}

impl fmt::Display for RouteMapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permit => write!(f, "permit"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

/// Direction of a route-map on a peering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RouteMapDirection {
    /// Applied on announcements received from the neighbor
    Incoming,
    /// Applied on announcements sent to the neighbor
    Outgoing,
}

impl fmt::Display for RouteMapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incoming => write!(f, "in"),
            Self::Outgoing => write!(f, "out"),
        }
    }
}

/// Match statement of a route-map item
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMapMatch {
    match_type: RouteMapType,
    field: RouteAnnouncementField,
    pattern: FieldPattern,
}

impl RouteMapMatch {
    /// Create a match statement. The pattern must fit the field: prefix patterns for the prefix and
    /// the next-hop, regular expressions for the AS path, community lists for the communities, and
    /// values for MED and local preference. For prefix patterns, the range type decides which
    /// prefix lengths are matched. MED and local preference only support `RangeType::Equal`, and
    /// the range type is ignored for the AS path and the communities.
    pub fn new(
        match_type: RouteMapType,
        field: RouteAnnouncementField,
        pattern: FieldPattern,
        range_type: RangeType,
    ) -> Result<Self, RouteMapError> {
        use RouteAnnouncementField as F;
        let pattern = match (field, pattern) {
            (F::IpPrefix, FieldPattern::Address(p)) | (F::NextHop, FieldPattern::Address(p)) => {
                FieldPattern::Address(p.with_range_type(range_type))
            }
            (F::Med, FieldPattern::Value(_)) | (F::LocalPref, FieldPattern::Value(_))
                if range_type != RangeType::Equal =>
            {
                return Err(RouteMapError::UnsupportedRangeType(field, range_type))
            }
            (F::Med, p @ FieldPattern::Value(_))
            | (F::LocalPref, p @ FieldPattern::Value(_))
            | (F::AsPath, p @ FieldPattern::AsPath(_))
            | (F::Communities, p @ FieldPattern::Communities(_)) => p,
            (f, p) => return Err(RouteMapError::UnsupportedPattern(f, p.kind())),
        };
        Ok(Self { match_type, field, pattern })
    }

    /// Create a prefix match statement that keeps the range of prefix lengths of the pattern, as
    /// created by [`SymbolicField::from_prefix_range`].
    pub fn prefix_range(
        match_type: RouteMapType,
        field: RouteAnnouncementField,
        pattern: SymbolicField,
    ) -> Result<Self, RouteMapError> {
        match field {
            RouteAnnouncementField::IpPrefix | RouteAnnouncementField::NextHop => {
                Ok(Self { match_type, field, pattern: FieldPattern::Address(pattern) })
            }
            f => Err(RouteMapError::UnsupportedPattern(f, "prefix")),
        }
    }

    /// Returns the match type
    pub fn match_type(&self) -> RouteMapType {
        self.match_type
    }

    /// Returns the matched field
    pub fn field(&self) -> RouteAnnouncementField {
        self.field
    }

    /// Returns the pattern
    pub fn pattern(&self) -> &FieldPattern {
        &self.pattern
    }

    /// Filter the announcement with this match statement. See [`RouteAnnouncement::filter`].
    pub fn apply(&self, announcement: &mut RouteAnnouncement) -> Result<FilterResult, RouteMapError> {
        announcement.filter(self.match_type, self.field, &self.pattern)
    }
}

impl fmt::Display for RouteMapMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match {} {} {}", self.field, self.match_type, self.pattern)
    }
}

/// Set action of a route-map item
#[derive(Debug, Clone, PartialEq)]
pub enum RouteMapAction {
    /// Set the next-hop
    NextHop(Ipv4Addr),
    /// Set the MED
    Med(u32),
    /// Set the local preference
    LocalPref(u32),
    /// Attach all the community tags
    Communities(Vec<Community>),
    /// Prepend the AS numbers to the AS path
    AsPathPrepend(Vec<AsId>),
}

impl RouteMapAction {
    /// Returns the field modified by the action
    pub fn field(&self) -> RouteAnnouncementField {
        match self {
            Self::NextHop(_) => RouteAnnouncementField::NextHop,
            Self::Med(_) => RouteAnnouncementField::Med,
            Self::LocalPref(_) => RouteAnnouncementField::LocalPref,
            Self::Communities(_) => RouteAnnouncementField::Communities,
            Self::AsPathPrepend(_) => RouteAnnouncementField::AsPath,
        }
    }

    /// Apply the action to the announcement. Setting a concrete value discards the deny list of
    /// the field, since all earlier rejections refer to the overwritten value.
    pub fn apply(&self, announcement: &mut RouteAnnouncement) -> Result<(), RouteMapError> {
        match self {
            Self::NextHop(addr) => {
                announcement.next_hop = SymbolicField::host(*addr);
                announcement.next_hop_deny.clear();
            }
            Self::Med(med) => {
                announcement.med = Some(*med);
                announcement.med_deny.clear();
            }
            Self::LocalPref(pref) => {
                announcement.local_pref = Some(*pref);
                announcement.local_pref_deny.clear();
            }
            Self::Communities(tags) => {
                announcement.communities.set_all(tags)?;
                announcement.community_deny.retain(|d| !d.iter().any(|t| tags.contains(t)));
            }
            Self::AsPathPrepend(path) => announcement.as_path = announcement.as_path.prepend(path),
        }
        Ok(())
    }
}

impl fmt::Display for RouteMapAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NextHop(addr) => write!(f, "set next-hop {}", addr),
            Self::Med(med) => write!(f, "set med {}", med),
            Self::LocalPref(pref) => write!(f, "set local-pref {}", pref),
            Self::Communities(tags) => write!(
                f,
                "set community {}",
                tags.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(" ")
            ),
            Self::AsPathPrepend(path) => write!(f, "set as-path prepend {}", format_path(path)),
        }
    }
}

/// Result of applying a single [`RouteMapItem`]
#[derive(Debug, Clone, PartialEq)]
pub struct ItemResult {
    /// Narrowed announcement. It is accepted by the item only if its `hit` flag is set, and nothing
    /// remains for later items if its `drop_remainder` flag is set.
    pub result: RouteAnnouncement,
    /// Announcements representing the parts not handled by this item, to be tested by the later
    /// items of the route-map.
    pub carry_forward: Vec<RouteAnnouncement>,
}

/// Single entry of a route-map, with conjunctive match statements and set actions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteMapItem {
    matches: Vec<RouteMapMatch>,
    actions: Vec<RouteMapAction>,
}

impl RouteMapItem {
    /// Create a new item. Every field can be matched at most once.
    pub fn new(
        matches: Vec<RouteMapMatch>,
        actions: Vec<RouteMapAction>,
    ) -> Result<Self, RouteMapError> {
        for (i, m) in matches.iter().enumerate() {
            if matches[..i].iter().any(|prev| prev.field == m.field) {
                return Err(RouteMapError::DuplicateMatch(m.field));
            }
        }
        Ok(Self { matches, actions })
    }

    /// Returns the match statements
    pub fn matches(&self) -> &[RouteMapMatch] {
        &self.matches
    }

    /// Returns the set actions
    pub fn actions(&self) -> &[RouteMapAction] {
        &self.actions
    }

    /// Iterate over all communities referenced by the item
    pub(crate) fn communities(&self) -> impl Iterator<Item = &Community> + '_ {
        let matched = self.matches.iter().filter_map(|m| match &m.pattern {
            FieldPattern::Communities(tags) => Some(tags.iter()),
            _ => None,
        });
        let set = self.actions.iter().filter_map(|a| match a {
            RouteMapAction::Communities(tags) => Some(tags.iter()),
            _ => None,
        });
        matched.chain(set).flatten()
    }

    /// Apply the item on the announcement.
    ///
    /// If any match statement matches nothing, the item does not apply: the result is not hit, and
    /// the unchanged input is carried forward. Otherwise, the result is the conjunction of all
    /// match statements. If any of them is a `Deny` statement, the result is not hit. Else, all
    /// actions are applied, and the result is hit. For every match statement that only matches a
    /// part of its field, the input with that field replaced by the unmatched part is carried
    /// forward. An item without match statements matches everything.
    pub fn apply(&self, input: &RouteAnnouncement) -> Result<ItemResult, RouteMapError> {
        let mut fresh = input.clone();
        fresh.reset_flags();

        let mut result = fresh.clone();
        let mut carry_forward = Vec::new();
        let mut denied = false;
        let mut drop_remainder = true;

        for m in self.matches.iter() {
            let filtered = m.apply(&mut result)?;
            if !filtered.matched {
                return Ok(ItemResult { result: fresh.clone(), carry_forward: vec![fresh] });
            }
            denied |= m.match_type.is_deny();
            if !result.drop_remainder {
                let mut remainder = fresh.clone();
                remainder.splice_field(m.field, &filtered.carry_forward);
                carry_forward.push(remainder);
            }
            drop_remainder &= result.drop_remainder;
        }

        if denied {
            result.hit = false;
        } else {
            for action in self.actions.iter() {
                action.apply(&mut result)?;
            }
            result.hit = true;
        }
        result.drop_remainder = drop_remainder;
        Ok(ItemResult { result, carry_forward })
    }
}

impl fmt::Display for RouteMapItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .matches
            .iter()
            .map(|m| m.to_string())
            .chain(self.actions.iter().map(|a| a.to_string()))
            .collect();
        if parts.is_empty() {
            write!(f, "match any")
        } else {
            write!(f, "{}", parts.join("; "))
        }
    }
}

/// # Route Map Item Builder
///
/// Convenience type to build a route-map item. If no match statement is added, the item matches
/// every announcement.
///
/// ```
/// # use bgpsym::netsim::route_map::*;
/// # use bgpsym::netsim::symbolic_field::{RangeType, SymbolicField};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let item = RouteMapItemBuilder::new()
///     .match_prefix(RouteMapType::Permit, SymbolicField::parse("10.0.0.0/8", RangeType::Ge)?)
///     .match_med(RouteMapType::Permit, 10)
///     .set_local_pref(200)
///     .build()?;
/// assert_eq!(item.matches().len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RouteMapItemBuilder {
    matches: Vec<RouteMapMatch>,
    actions: Vec<RouteMapAction>,
}

impl RouteMapItemBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a match statement
    pub fn cond(&mut self, cond: RouteMapMatch) -> &mut Self {
        self.matches.push(cond);
        self
    }

    /// Match the prefix, with the lengths determined by the range type of the pattern.
    pub fn match_prefix(&mut self, match_type: RouteMapType, pattern: SymbolicField) -> &mut Self {
        self.cond(RouteMapMatch {
            match_type,
            field: RouteAnnouncementField::IpPrefix,
            pattern: FieldPattern::Address(pattern),
        })
    }

    /// Match the next-hop, with the lengths determined by the range type of the pattern.
    pub fn match_next_hop(&mut self, match_type: RouteMapType, pattern: SymbolicField) -> &mut Self {
        self.cond(RouteMapMatch {
            match_type,
            field: RouteAnnouncementField::NextHop,
            pattern: FieldPattern::Address(pattern),
        })
    }

    /// Match the AS path against the set of paths
    pub fn match_as_path(&mut self, match_type: RouteMapType, pattern: AsPathSet) -> &mut Self {
        self.cond(RouteMapMatch {
            match_type,
            field: RouteAnnouncementField::AsPath,
            pattern: FieldPattern::AsPath(pattern),
        })
    }

    /// Match if all community tags are present
    pub fn match_communities(&mut self, match_type: RouteMapType, tags: Vec<Community>) -> &mut Self {
        self.cond(RouteMapMatch {
            match_type,
            field: RouteAnnouncementField::Communities,
            pattern: FieldPattern::Communities(tags),
        })
    }

    /// Match the exact MED value
    pub fn match_med(&mut self, match_type: RouteMapType, med: u32) -> &mut Self {
        self.cond(RouteMapMatch {
            match_type,
            field: RouteAnnouncementField::Med,
            pattern: FieldPattern::Value(med),
        })
    }

    /// Match the exact local preference
    pub fn match_local_pref(&mut self, match_type: RouteMapType, pref: u32) -> &mut Self {
        self.cond(RouteMapMatch {
            match_type,
            field: RouteAnnouncementField::LocalPref,
            pattern: FieldPattern::Value(pref),
        })
    }

    /// Add a set action
    pub fn add_set(&mut self, action: RouteMapAction) -> &mut Self {
        self.actions.push(action);
        self
    }

    /// Set the next-hop
    pub fn set_next_hop(&mut self, next_hop: Ipv4Addr) -> &mut Self {
        self.add_set(RouteMapAction::NextHop(next_hop))
    }

    /// Set the MED
    pub fn set_med(&mut self, med: u32) -> &mut Self {
        self.add_set(RouteMapAction::Med(med))
    }

    /// Set the local preference
    pub fn set_local_pref(&mut self, pref: u32) -> &mut Self {
        self.add_set(RouteMapAction::LocalPref(pref))
    }

    /// Attach the community tags
    pub fn set_communities(&mut self, tags: Vec<Community>) -> &mut Self {
        self.add_set(RouteMapAction::Communities(tags))
    }

    /// Prepend the AS numbers to the AS path
    pub fn prepend_as_path(&mut self, path: Vec<AsId>) -> &mut Self {
        self.add_set(RouteMapAction::AsPathPrepend(path))
    }

    /// Build the item. This fails if the same field is matched more than once.
    pub fn build(&self) -> Result<RouteMapItem, RouteMapError> {
        RouteMapItem::new(self.matches.clone(), self.actions.clone())
    }
}

/// # Main RouteMap structure
///
/// Items are evaluated in the order of their sequence number. Items with the same sequence number
/// are evaluated in the order in which they were added.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteMap {
    name: String,
    items: Vec<(usize, RouteMapItem)>,
}

impl RouteMap {
    /// Create an empty route-map
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into(), items: Vec::new() }
    }

    /// Returns the name of the route-map
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an item with the given sequence number
    pub fn add_item(&mut self, seq: usize, item: RouteMapItem) -> &mut Self {
        let pos = self.items.partition_point(|(s, _)| *s <= seq);
        self.items.insert(pos, (seq, item));
        self
    }

    /// Iterate over all items with their sequence number, in evaluation order
    pub fn items(&self) -> std::slice::Iter<'_, (usize, RouteMapItem)> {
        self.items.iter()
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the route-map has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Apply the route-map on the announcement, and return all announcements that are permitted.
    /// Every concrete announcement permitted by the route-map is represented by at least one of the
    /// returned announcements. If every item matches at most one field, the returned announcements
    /// are pairwise disjoint. Items matching several fields may leave overlapping remainders, one
    /// per field, which later items permit separately. A route-map without items permits
    /// everything.
    ///
    /// ```
    /// # use bgpsym::netsim::route_map::*;
    /// # use bgpsym::netsim::announcement::RouteAnnouncement;
    /// # use bgpsym::netsim::community::CommunityUniverse;
    /// # use bgpsym::netsim::symbolic_field::{RangeType, SymbolicField};
    /// # use std::sync::Arc;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut map = RouteMap::new("import");
    /// map.add_item(
    ///     10,
    ///     RouteMapItemBuilder::new()
    ///         .match_prefix(RouteMapType::Deny, SymbolicField::parse("10.1.0.0/16", RangeType::Ge)?)
    ///         .build()?,
    /// );
    /// map.add_item(20, RouteMapItem::default());
    /// let ann = RouteAnnouncement::new(Arc::new(CommunityUniverse::default()));
    /// let result = map.apply(&ann, RouteMapDirection::Incoming)?;
    /// assert_eq!(result.len(), 1);
    /// assert_eq!(result[0].ip_prefix_deny().len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn apply(
        &self,
        announcement: &RouteAnnouncement,
        direction: RouteMapDirection,
    ) -> Result<Vec<RouteAnnouncement>, RouteMapError> {
        if self.items.is_empty() {
            return Ok(vec![announcement.clone()]);
        }

        let mut permitted = Vec::new();
        let mut pending = vec![announcement.clone()];
        for (seq, item) in self.items.iter() {
            if pending.is_empty() {
                break;
            }
            let mut next_pending = Vec::new();
            for ann in pending.iter() {
                let ItemResult { result, carry_forward } = item.apply(ann)?;
                let drop_remainder = result.drop_remainder;
                if result.hit {
                    trace!("route-map {} {} seq {}: permit {}", self.name, direction, seq, result);
                    permitted.push(result);
                }
                if !drop_remainder {
                    next_pending.extend(carry_forward);
                }
            }
            pending = next_pending;
        }

        debug!(
            "route-map {} {}: {} announcement(s) permitted, {} fell through",
            self.name,
            direction,
            permitted.len(),
            pending.len()
        );
        Ok(permitted)
    }
}

impl fmt::Display for RouteMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route-map {}", self.name)?;
        for (seq, item) in self.items.iter() {
            write!(f, "\n  {:>5}: {}", seq, item)?;
        }
        Ok(())
    }
}
