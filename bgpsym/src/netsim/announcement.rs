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

//! # Symbolic Route Announcements
//!
//! A [`RouteAnnouncement`] represents a (possibly infinite) set of concrete BGP announcements. Each
//! attribute is either concrete or symbolic, and address fields and communities keep a history of
//! the values that were rejected by earlier route-map entries (the *deny lists*). The announcement
//! is narrowed step by step by [`RouteAnnouncement::filter`], which splits it into the part matched
//! by a pattern and the part that remains for later route-map entries.

use crate::netsim::as_path::AsPathSet;
use crate::netsim::community::{Community, CommunitySet, CommunityUniverse};
use crate::netsim::printer;
use crate::netsim::route_map::RouteMapType;
use crate::netsim::symbolic_field::{covered_by, SymbolicField};
use crate::netsim::RouteMapError;

use log::*;
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Attribute of an announcement that can be matched or set by a route-map
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RouteAnnouncementField {
    /// The announced prefix
    IpPrefix,
    /// The next-hop address
    NextHop,
    /// The AS path
    AsPath,
    /// Multi-exit discriminator
    Med,
    /// Local preference
    LocalPref,
    /// Community tags
    Communities,
}

impl fmt::Display for RouteAnnouncementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IpPrefix => write!(f, "ip prefix"),
            Self::NextHop => write!(f, "next-hop"),
            Self::AsPath => write!(f, "as-path"),
            Self::Med => write!(f, "med"),
            Self::LocalPref => write!(f, "local-pref"),
            Self::Communities => write!(f, "community"),
        }
    }
}

/// Pattern to match an attribute against
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPattern {
    /// Prefix list entry, for the prefix or the next-hop
    Address(SymbolicField),
    /// AS-path access list entry
    AsPath(AsPathSet),
    /// Community list entry, matching if all tags are present
    Communities(Vec<Community>),
    /// Exact value, for MED or local preference
    Value(u32),
}

impl FieldPattern {
    /// Name of the kind of pattern
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Address(_) => "prefix",
            Self::AsPath(_) => "as-path",
            Self::Communities(_) => "community",
            Self::Value(_) => "value",
        }
    }
}

impl fmt::Display for FieldPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(p) => write!(f, "{}", p),
            Self::AsPath(p) => write!(f, "{}", p),
            Self::Communities(c) => {
                write!(f, "{}", c.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" "))
            }
            Self::Value(v) => write!(f, "{}", v),
        }
    }
}

/// Result of [`RouteAnnouncement::filter`]
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    /// `false` if the pattern matches nothing of the remaining announcement
    pub matched: bool,
    /// Announcement representing what remains after removing the matched part. Only the filtered
    /// field and its deny list are meaningful.
    pub carry_forward: RouteAnnouncement,
}

/// # Symbolic route announcement
///
/// ```
/// # use bgpsym::netsim::announcement::*;
/// # use bgpsym::netsim::community::CommunityUniverse;
/// # use bgpsym::netsim::route_map::RouteMapType;
/// # use bgpsym::netsim::symbolic_field::{RangeType, SymbolicField};
/// # use std::sync::Arc;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut ann = RouteAnnouncement::new(Arc::new(CommunityUniverse::default()));
/// let pattern = FieldPattern::Address(SymbolicField::parse("10.0.0.0/8", RangeType::Ge)?);
/// let result = ann.filter(RouteMapType::Permit, RouteAnnouncementField::IpPrefix, &pattern)?;
/// assert!(result.matched);
/// assert!(ann.hit());
/// assert_eq!(ann.ip_prefix().to_string(), "10.0.0.0/8 [8, 32] GE");
/// assert_eq!(result.carry_forward.ip_prefix_deny().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RouteAnnouncement {
    pub(crate) ip_prefix: SymbolicField,
    pub(crate) ip_prefix_deny: Vec<SymbolicField>,
    pub(crate) next_hop: SymbolicField,
    pub(crate) next_hop_deny: Vec<SymbolicField>,
    pub(crate) as_path: AsPathSet,
    pub(crate) med: Option<u32>,
    pub(crate) med_deny: Vec<u32>,
    pub(crate) local_pref: Option<u32>,
    pub(crate) local_pref_deny: Vec<u32>,
    pub(crate) communities: CommunitySet,
    pub(crate) community_deny: Vec<Vec<Community>>,
    pub(crate) hit: bool,
    pub(crate) drop_remainder: bool,
}

enum Outcome {
    /// Nothing of the field is matched
    NoMatch,
    /// The pattern matches everything of the field
    Superset,
    /// The pattern matches only parts of the field
    Partial,
}

impl RouteAnnouncement {
    /// Fully symbolic announcement, standing for every possible announcement.
    pub fn new(universe: Arc<CommunityUniverse>) -> Self {
        Self {
            ip_prefix: SymbolicField::any(),
            ip_prefix_deny: Vec::new(),
            next_hop: SymbolicField::any(),
            next_hop_deny: Vec::new(),
            as_path: AsPathSet::any(),
            med: None,
            med_deny: Vec::new(),
            local_pref: None,
            local_pref_deny: Vec::new(),
            communities: CommunitySet::new(universe),
            community_deny: Vec::new(),
            hit: false,
            drop_remainder: false,
        }
    }

    /// Announcement of a single concrete prefix, with all other attributes symbolic.
    pub fn with_prefix(universe: Arc<CommunityUniverse>, prefix: SymbolicField) -> Self {
        Self { ip_prefix: prefix, ..Self::new(universe) }
    }

    /// Returns the symbolic prefix
    pub fn ip_prefix(&self) -> &SymbolicField {
        &self.ip_prefix
    }

    /// Returns the prefixes that were rejected earlier
    pub fn ip_prefix_deny(&self) -> &[SymbolicField] {
        &self.ip_prefix_deny
    }

    /// Returns the symbolic next-hop
    pub fn next_hop(&self) -> &SymbolicField {
        &self.next_hop
    }

    /// Returns the next-hops that were rejected earlier
    pub fn next_hop_deny(&self) -> &[SymbolicField] {
        &self.next_hop_deny
    }

    /// Returns the set of AS paths
    pub fn as_path(&self) -> &AsPathSet {
        &self.as_path
    }

    /// Returns the MED, or `None` if it is symbolic
    pub fn med(&self) -> Option<u32> {
        self.med
    }

    /// Returns the MED values that were rejected earlier
    pub fn med_deny(&self) -> &[u32] {
        &self.med_deny
    }

    /// Returns the local preference, or `None` if it is symbolic
    pub fn local_pref(&self) -> Option<u32> {
        self.local_pref
    }

    /// Returns the local preferences that were rejected earlier
    pub fn local_pref_deny(&self) -> &[u32] {
        &self.local_pref_deny
    }

    /// Returns the symbolic set of communities
    pub fn communities(&self) -> &CommunitySet {
        &self.communities
    }

    /// Returns the community combinations that were rejected earlier. Each entry means that not all
    /// of its tags are present at the same time.
    pub fn community_deny(&self) -> &[Vec<Community>] {
        &self.community_deny
    }

    /// Returns `true` if the last filter or route-map item accepted the announcement.
    pub fn hit(&self) -> bool {
        self.hit
    }

    /// Returns `true` if nothing of the announcement remains for later route-map items.
    pub fn drop_remainder(&self) -> bool {
        self.drop_remainder
    }

    pub(crate) fn reset_flags(&mut self) {
        self.hit = false;
        self.drop_remainder = false;
    }

    /// Narrow the announcement by a single match statement.
    ///
    /// - If the pattern matches nothing that was not already rejected earlier, `self` is left
    ///   unchanged with `hit` cleared, and the result is not `matched`.
    /// - If the pattern matches the entire field, `drop_remainder` is set, and `hit` tells whether
    ///   the match type is `Permit`.
    /// - Otherwise, a `Permit` pattern narrows the field to the matched part and keeps the deny
    ///   list, and a `Deny` pattern adds the matched part to the deny list. In both cases, the
    ///   carry-forward announcement has the matched part added to its deny list.
    pub fn filter(
        &mut self,
        match_type: RouteMapType,
        field: RouteAnnouncementField,
        pattern: &FieldPattern,
    ) -> Result<FilterResult, RouteMapError> {
        use RouteAnnouncementField as F;
        let permit = match_type.is_permit();
        let mut next = self.clone();
        next.reset_flags();

        let outcome = match (field, pattern) {
            (F::IpPrefix, FieldPattern::Address(p)) => filter_address(
                &mut self.ip_prefix,
                &mut self.ip_prefix_deny,
                &mut next.ip_prefix_deny,
                p,
                permit,
            ),
            (F::NextHop, FieldPattern::Address(p)) => filter_address(
                &mut self.next_hop,
                &mut self.next_hop_deny,
                &mut next.next_hop_deny,
                p,
                permit,
            ),
            (F::AsPath, FieldPattern::AsPath(p)) => {
                filter_as_path(&mut self.as_path, &mut next.as_path, p, permit)
            }
            (F::Med, FieldPattern::Value(v)) => {
                filter_value(&mut self.med, &mut self.med_deny, &mut next.med_deny, *v, permit)
            }
            (F::LocalPref, FieldPattern::Value(v)) => filter_value(
                &mut self.local_pref,
                &mut self.local_pref_deny,
                &mut next.local_pref_deny,
                *v,
                permit,
            ),
            (F::Communities, FieldPattern::Communities(tags)) => filter_communities(
                &mut self.communities,
                &mut self.community_deny,
                &mut next,
                tags,
                permit,
            )?,
            (f, p) => return Err(RouteMapError::UnsupportedPattern(f, p.kind())),
        };

        let matched = match outcome {
            Outcome::NoMatch => {
                trace!("{} {} {}: no match", match_type, field, pattern);
                self.hit = false;
                self.drop_remainder = false;
                false
            }
            Outcome::Superset => {
                trace!("{} {} {}: matches everything", match_type, field, pattern);
                self.hit = permit;
                self.drop_remainder = true;
                true
            }
            Outcome::Partial => {
                trace!("{} {} {}: partial match", match_type, field, pattern);
                self.hit = permit;
                self.drop_remainder = false;
                true
            }
        };
        Ok(FilterResult { matched, carry_forward: next })
    }

    /// Replace the field (and its deny list) by the one of `other`.
    pub(crate) fn splice_field(&mut self, field: RouteAnnouncementField, other: &Self) {
        use RouteAnnouncementField as F;
        match field {
            F::IpPrefix => {
                self.ip_prefix = other.ip_prefix;
                self.ip_prefix_deny = other.ip_prefix_deny.clone();
            }
            F::NextHop => {
                self.next_hop = other.next_hop;
                self.next_hop_deny = other.next_hop_deny.clone();
            }
            F::AsPath => self.as_path = other.as_path.clone(),
            F::Med => {
                self.med = other.med;
                self.med_deny = other.med_deny.clone();
            }
            F::LocalPref => {
                self.local_pref = other.local_pref;
                self.local_pref_deny = other.local_pref_deny.clone();
            }
            F::Communities => {
                self.communities = other.communities.clone();
                self.community_deny = other.community_deny.clone();
            }
        }
    }

    /// Returns `true` if the concrete prefix `addr/len` is represented by this announcement, i.e.,
    /// it is part of the symbolic prefix and was not rejected earlier.
    pub fn permits_prefix(&self, addr: Ipv4Addr, len: u8) -> bool {
        self.ip_prefix.contains(addr, len) && !self.ip_prefix_deny.iter().any(|d| d.contains(addr, len))
    }

    /// Returns `true` if the concrete next-hop is represented by this announcement.
    pub fn permits_next_hop(&self, addr: Ipv4Addr) -> bool {
        self.next_hop.contains(addr, 32) && !self.next_hop_deny.iter().any(|d| d.contains(addr, 32))
    }

    /// Returns `true` if the concrete set of community tags is represented by this announcement.
    pub fn permits_communities(&self, tags: &[Community]) -> bool {
        self.communities.accepts(tags)
            && !self.community_deny.iter().any(|d| d.iter().all(|t| tags.contains(t)))
    }
}

impl PartialEq for RouteAnnouncement {
    /// Compares all attributes and deny lists, but not the `hit` and `drop_remainder` flags.
    fn eq(&self, other: &Self) -> bool {
        self.ip_prefix == other.ip_prefix
            && self.ip_prefix_deny == other.ip_prefix_deny
            && self.next_hop == other.next_hop
            && self.next_hop_deny == other.next_hop_deny
            && self.as_path == other.as_path
            && self.med == other.med
            && self.med_deny == other.med_deny
            && self.local_pref == other.local_pref
            && self.local_pref_deny == other.local_pref_deny
            && self.communities == other.communities
            && self.community_deny == other.community_deny
    }
}

impl fmt::Display for RouteAnnouncement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", printer::announcement(self))
    }
}

fn filter_address(
    value: &mut SymbolicField,
    deny: &mut Vec<SymbolicField>,
    next_deny: &mut Vec<SymbolicField>,
    pattern: &SymbolicField,
    permit: bool,
) -> Outcome {
    let overlap = match pattern.overlap(value) {
        Some(o) if !covered_by(&o, deny) => o,
        _ => return Outcome::NoMatch,
    };
    if pattern.is_superset_of(value) {
        return Outcome::Superset;
    }
    if permit {
        *value = overlap;
    } else {
        deny.push(overlap);
    }
    next_deny.push(overlap);
    Outcome::Partial
}

fn filter_as_path(
    value: &mut AsPathSet,
    next_value: &mut AsPathSet,
    pattern: &AsPathSet,
    permit: bool,
) -> Outcome {
    if pattern.is_disjoint_from(value) {
        return Outcome::NoMatch;
    }
    if pattern.is_superset_of(value) {
        return Outcome::Superset;
    }
    *next_value = value.difference(pattern);
    if permit {
        *value = value.intersect(pattern);
    }
    Outcome::Partial
}

fn filter_value(
    value: &mut Option<u32>,
    deny: &mut Vec<u32>,
    next_deny: &mut Vec<u32>,
    pattern: u32,
    permit: bool,
) -> Outcome {
    match value {
        Some(v) if *v == pattern => Outcome::Superset,
        Some(_) => Outcome::NoMatch,
        None if deny.contains(&pattern) => Outcome::NoMatch,
        None => {
            if permit {
                *value = Some(pattern);
                deny.clear();
            } else {
                deny.push(pattern);
            }
            next_deny.push(pattern);
            Outcome::Partial
        }
    }
}

fn filter_communities(
    value: &mut CommunitySet,
    deny: &mut Vec<Vec<Community>>,
    next: &mut RouteAnnouncement,
    tags: &[Community],
    permit: bool,
) -> Result<Outcome, RouteMapError> {
    let matched = match value.match_all(tags)? {
        Some(m) if !deny.iter().any(|d| m.requires_all(d)) => m,
        _ => return Ok(Outcome::NoMatch),
    };
    if value.requires_all(tags) {
        return Ok(Outcome::Superset);
    }
    if permit {
        *value = matched;
    } else {
        deny.push(tags.to_vec());
    }
    match tags {
        [tag] => next.communities.exclude(tag)?,
        _ => next.community_deny.push(tags.to_vec()),
    }
    Ok(Outcome::Partial)
}
