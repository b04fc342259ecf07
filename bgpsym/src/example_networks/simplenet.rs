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

//! # Simplenet Network

use super::ExampleNetwork;
use crate::netsim::route_map::{RouteMap, RouteMapDirection::*, RouteMapItemBuilder, RouteMapType::*};
use crate::netsim::symbolic_field::{RangeType, SymbolicField};
use crate::netsim::{AsId, NetworkTopology};
use crate::Error;

/// # Simplenet
///
/// A single internal router `main` (AS 10) between `in_neighbor` (AS 9) and `out_neighbor`
/// (AS 11).
///
/// - `main` imports from `in_neighbor` everything within `10.0.0.0/8`.
/// - `main` exports to `out_neighbor` everything within `10.0.10.0/24`.
#[derive(Debug)]
pub struct SimpleNet {}

impl ExampleNetwork for SimpleNet {
    fn net() -> Result<NetworkTopology, Error> {
        let mut net = NetworkTopology::new("SimpleNet");

        let main = net.add_router("main", AsId(10))?;
        let e_in = net.add_external_router("in_neighbor", AsId(9))?;
        let e_out = net.add_external_router("out_neighbor", AsId(11))?;

        net.add_peering(main, e_in)?;
        net.add_peering(main, e_out)?;

        let mut import = RouteMap::new("import");
        import.add_item(
            10,
            RouteMapItemBuilder::new()
                .match_prefix(Permit, SymbolicField::parse("10.0.0.0/8", RangeType::Ge)?)
                .build()?,
        );
        net.set_route_map(main, e_in, Incoming, import)?;

        let mut export = RouteMap::new("export");
        export.add_item(
            10,
            RouteMapItemBuilder::new()
                .match_prefix(Permit, SymbolicField::parse("10.0.10.0/24", RangeType::Ge)?)
                .build()?,
        );
        net.set_route_map(main, e_out, Outgoing, export)?;

        Ok(net)
    }

    fn origin() -> &'static str {
        "in_neighbor"
    }
}
