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

//! # Filter Chain Network

use super::ExampleNetwork;
use crate::netsim::route_map::{RouteMap, RouteMapDirection::*, RouteMapItemBuilder, RouteMapType::*};
use crate::netsim::symbolic_field::{RangeType, SymbolicField};
use crate::netsim::{AsId, NetworkTopology};
use crate::Error;

/// # Filter Chain Network
///
/// Two internal routers in series, each narrowing the prefixes with a prefix list:
///
/// ```text
/// e1 ---> r1 ---> r2 ---> e2
/// ```
///
/// - `r1` imports from `e1`:
///   - seq 10: deny `10.1.0.0/16 ge 16`
///   - seq 20: permit `10.0.0.0/8 ge 8`
/// - `r2` imports from `r1`:
///   - seq 10: permit `10.2.0.0/16 ge 16`, and set the MED to 20
///   - seq 20: permit `10.0.0.0/8 ge 8`
#[derive(Debug)]
pub struct FilterChainNet {}

impl ExampleNetwork for FilterChainNet {
    fn net() -> Result<NetworkTopology, Error> {
        let mut net = NetworkTopology::new("FilterChainNet");

        let r1 = net.add_router("r1", AsId(65001))?;
        let r2 = net.add_router("r2", AsId(65001))?;
        let e1 = net.add_external_router("e1", AsId(65101))?;
        let e2 = net.add_external_router("e2", AsId(65102))?;

        net.add_peering(e1, r1)?;
        net.add_peering(r1, r2)?;
        net.add_peering(r2, e2)?;

        let mut r1_in = RouteMap::new("r1_in");
        r1_in.add_item(
            10,
            RouteMapItemBuilder::new()
                .match_prefix(Deny, SymbolicField::parse("10.1.0.0/16", RangeType::Ge)?)
                .build()?,
        );
        r1_in.add_item(
            20,
            RouteMapItemBuilder::new()
                .match_prefix(Permit, SymbolicField::parse("10.0.0.0/8", RangeType::Ge)?)
                .build()?,
        );
        net.set_route_map(r1, e1, Incoming, r1_in)?;

        let mut r2_in = RouteMap::new("r2_in");
        r2_in.add_item(
            10,
            RouteMapItemBuilder::new()
                .match_prefix(Permit, SymbolicField::parse("10.2.0.0/16", RangeType::Ge)?)
                .set_med(20)
                .build()?,
        );
        r2_in.add_item(
            20,
            RouteMapItemBuilder::new()
                .match_prefix(Permit, SymbolicField::parse("10.0.0.0/8", RangeType::Ge)?)
                .build()?,
        );
        net.set_route_map(r2, r1, Incoming, r2_in)?;

        Ok(net)
    }

    fn origin() -> &'static str {
        "e1"
    }
}
