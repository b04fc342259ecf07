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

#![deny(missing_docs, missing_debug_implementations)]

//! # NetSim
//!
//! Symbolic model of BGP announcements flowing through route-maps and network topologies.
//!
//! Instead of simulating individual routes, the network is fed with a *symbolic* announcement,
//! standing for every possible announcement at once. Each route-map splits the symbolic
//! announcements it receives into the parts it permits (possibly modified by set actions) and the
//! parts it rejects. Items matching a single field produce disjoint parts, while items matching
//! several fields may leave overlapping remainders. At the end, every external router knows exactly
//! which announcements can reach it.
//!
//! ## Example usage
//!
//! The following example builds a network with one internal router `main`, which only accepts
//! prefixes within `10.0.0.0/8` from `in_neighbor`, and only exports prefixes within
//! `10.0.10.0/24` to `out_neighbor`.
//!
//! ```rust
//! use bgpsym::netsim::{AsId, NetworkTopology};
//! use bgpsym::netsim::route_map::*;
//! use bgpsym::netsim::symbolic_field::{RangeType, SymbolicField};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut net = NetworkTopology::new("simple");
//!
//!     let main = net.add_router("main", AsId(10))?;
//!     let e_in = net.add_external_router("in_neighbor", AsId(9))?;
//!     let e_out = net.add_external_router("out_neighbor", AsId(11))?;
//!     net.add_peering(main, e_in)?;
//!     net.add_peering(main, e_out)?;
//!
//!     let mut import = RouteMap::new("import");
//!     import.add_item(
//!         10,
//!         RouteMapItemBuilder::new()
//!             .match_prefix(RouteMapType::Permit, SymbolicField::parse("10.0.0.0/8", RangeType::Ge)?)
//!             .build()?,
//!     );
//!     net.set_route_map(main, e_in, RouteMapDirection::Incoming, import)?;
//!
//!     let mut export = RouteMap::new("export");
//!     export.add_item(
//!         10,
//!         RouteMapItemBuilder::new()
//!             .match_prefix(RouteMapType::Permit, SymbolicField::parse("10.0.10.0/24", RangeType::Ge)?)
//!             .build()?,
//!     );
//!     net.set_route_map(main, e_out, RouteMapDirection::Outgoing, export)?;
//!
//!     let result = net.propagate_announcement("in_neighbor")?;
//!     let received = &result["out_neighbor"];
//!     assert_eq!(received.len(), 1);
//!     assert_eq!(received[0].ip_prefix().to_string(), "10.0.10.0/24 [24, 32] GE");
//!
//!     Ok(())
//! }
//! ```

pub mod announcement;
pub mod as_path;
pub mod community;
pub mod external_router;
pub mod network;
pub mod printer;
pub mod route_map;
pub mod router;
pub mod symbolic_field;
mod types;

pub use announcement::{FieldPattern, RouteAnnouncement, RouteAnnouncementField};
pub use network::{NetworkTopology, PropagationResult};
pub use types::*;
