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

//! # Triangle Network

use super::ExampleNetwork;
use crate::netsim::route_map::{RouteMap, RouteMapDirection::*, RouteMapItemBuilder, RouteMapType::*};
use crate::netsim::symbolic_field::{RangeType, SymbolicField};
use crate::netsim::{AsId, NetworkTopology};
use crate::Error;

/// # Triangle Network
///
/// Three internal routers connected in a cycle, with one external router at `r1` and `r3`:
///
/// ```text
///        r2
///       /  \
/// e1 - r1 -- r3 - e3
/// ```
///
/// - `r3` exports to `e3` only prefixes within `20.0.0.0/8`.
/// - `r2` imports from `r1` only prefixes within `20.1.0.0/16`.
#[derive(Debug)]
pub struct TriangleNet {}

impl ExampleNetwork for TriangleNet {
    fn net() -> Result<NetworkTopology, Error> {
        let mut net = NetworkTopology::new("TriangleNet");

        let r1 = net.add_router("r1", AsId(65001))?;
        let r2 = net.add_router("r2", AsId(65001))?;
        let r3 = net.add_router("r3", AsId(65001))?;
        let e1 = net.add_external_router("e1", AsId(65101))?;
        let e3 = net.add_external_router("e3", AsId(65103))?;

        net.add_peering(e1, r1)?;
        net.add_peering(r1, r2)?;
        net.add_peering(r2, r3)?;
        net.add_peering(r3, r1)?;
        net.add_peering(r3, e3)?;

        let mut r2_in = RouteMap::new("r2_in");
        r2_in.add_item(
            10,
            RouteMapItemBuilder::new()
                .match_prefix(Permit, SymbolicField::parse("20.1.0.0/16", RangeType::Ge)?)
                .build()?,
        );
        net.set_route_map(r2, r1, Incoming, r2_in)?;

        let mut r3_out = RouteMap::new("r3_out");
        r3_out.add_item(
            10,
            RouteMapItemBuilder::new()
                .match_prefix(Permit, SymbolicField::parse("20.0.0.0/8", RangeType::Ge)?)
                .build()?,
        );
        net.set_route_map(r3, e3, Outgoing, r3_out)?;

        Ok(net)
    }

    fn origin() -> &'static str {
        "e1"
    }
}
