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

//! Module containing all type definitions

use crate::dfa::RegexError;
use crate::netsim::announcement::RouteAnnouncementField;
use crate::netsim::community::Community;
use crate::netsim::external_router::ExternalRouter;
use crate::netsim::router::InternalRouter;
use crate::netsim::symbolic_field::RangeType;
use petgraph::prelude::*;
use petgraph::stable_graph::StableGraph;
use thiserror::Error;

type IndexType = u32;
/// Router Identification (and index into the graph)
pub type RouterId = NodeIndex<IndexType>;
/// AS Number
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct AsId(pub u32);
/// Graph of BGP peerings between routers
pub type PeeringGraph = StableGraph<(), (), Undirected, IndexType>;

/// # Network Device (similar to `Option`)
/// Enumerates all possible network devices. This struct behaves similar to an `Option`, but it
/// knows two different `Some` values, the `InternalRouter` and the `ExternalRouter`.
#[derive(Debug)]
pub enum NetworkDevice<'a> {
    /// Internal Router
    InternalRouter(&'a InternalRouter),
    /// External Router
    ExternalRouter(&'a ExternalRouter),
    /// None was found
    None,
}

impl<'a> NetworkDevice<'a> {
    /// Returns true if and only if self contains an internal router.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InternalRouter(_))
    }

    /// Returns true if and only if self contains an external router.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::ExternalRouter(_))
    }

    /// Returns true if and only if self contains `NetworkDevice::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the name of the device, or `None` if the device does not exist.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            Self::InternalRouter(r) => Some(r.name()),
            Self::ExternalRouter(r) => Some(r.name()),
            Self::None => None,
        }
    }

    /// Maps the `NetworkDevice` to result, with the `Ok` case only if self is `InternalRouter`. If
    /// `self` is not `InternalError`, then the provided error is returned.
    pub fn internal_or<E: std::error::Error>(self, error: E) -> Result<&'a InternalRouter, E> {
        match self {
            Self::InternalRouter(e) => Ok(e),
            _ => Err(error),
        }
    }

    /// Maps the `NetworkDevice` to result, with the `Ok` case only if self is `ExternalRouter`. If
    /// `self` is not `ExternalRouter`, then the provided error is returned.
    pub fn external_or<E: std::error::Error>(self, error: E) -> Result<&'a ExternalRouter, E> {
        match self {
            Self::ExternalRouter(e) => Ok(e),
            _ => Err(error),
        }
    }
}

/// Errors while constructing a symbolic field
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// The prefix could not be parsed
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),
    /// The prefix length is larger than 32
    #[error("Invalid prefix length: {0}")]
    InvalidPrefixLength(u8),
    /// The range of prefix lengths is not valid
    #[error("Invalid range of prefix lengths: [{0}, {1}]")]
    InvalidPrefixRange(u8, u8),
    /// The community could not be parsed
    #[error("Invalid community: {0}")]
    InvalidCommunity(String),
    /// The AS-path regular expression could not be parsed
    #[error("Invalid AS-path regex: {0}")]
    InvalidRegex(#[from] RegexError),
}

/// Errors while building or applying route-maps
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteMapError {
    /// The pattern kind does not fit the field
    #[error("Field {0:?} cannot be matched with a {1} pattern")]
    UnsupportedPattern(RouteAnnouncementField, &'static str),
    /// The field only supports exact matches
    #[error("Field {0:?} does not support the range type {1}")]
    UnsupportedRangeType(RouteAnnouncementField, RangeType),
    /// The same field is matched twice in the same item
    #[error("Field {0:?} is matched more than once in the same route-map item")]
    DuplicateMatch(RouteAnnouncementField),
    /// A community is not part of the network-wide universe
    #[error("Community {0} is not part of the community universe")]
    UnknownCommunity(Community),
}

/// Network Errors
#[derive(Error, Debug, PartialEq)]
pub enum NetworkError {
    /// Device is not present in the topology
    #[error("Network device was not found in topology: {0:?}")]
    DeviceNotFound(RouterId),
    /// Device name is not present in the topology
    #[error("Network device name was not found in topology: {0}")]
    DeviceNameNotFound(String),
    /// Another device already uses the name
    #[error("Network device name is already used: {0}")]
    DeviceNameAlreadyExists(String),
    /// Device must be an internal router, but an external router was passed
    #[error("Network device cannot be an external router: {0:?}")]
    DeviceIsExternalRouter(RouterId),
    /// Device must be an external router, but an internal router was passed
    #[error("Network device cannot be an internal router: {0:?}")]
    DeviceIsInternalRouter(RouterId),
    /// The two routers do not have a peering session
    #[error("Router {0:?} and {1:?} are not connected")]
    RoutersNotConnected(RouterId, RouterId),
    /// The origin of an announcement has no internal router as a neighbor
    #[error("External router {0:?} has no peering with an internal router")]
    NoIngressRouter(RouterId),
    /// The propagation took more steps than allowed
    #[error("Propagation was aborted after {0} steps")]
    PropagationLimitReached(usize),
    /// Error while applying a route-map
    #[error("Route-map error: {0}")]
    RouteMapError(#[from] RouteMapError),
}
