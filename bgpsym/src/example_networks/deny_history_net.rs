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

//! # Deny History Network

use super::ExampleNetwork;
use crate::netsim::route_map::{
    RouteMap, RouteMapDirection::*, RouteMapItem, RouteMapItemBuilder, RouteMapType::*,
};
use crate::netsim::symbolic_field::{RangeType, SymbolicField};
use crate::netsim::{AsId, NetworkTopology};
use crate::Error;

/// # Deny History Network
///
/// Same topology as [`SimpleNet`](super::SimpleNet), where a deny entry of the export route-map
/// only hits a part of the imported prefixes.
///
/// - `main` imports from `in_neighbor`:
///   - seq 10: permit `21.0.0.0/9 ge 9`
///   - seq 20: permit everything
/// - `main` exports to `out_neighbor`:
///   - seq 10: deny `21.0.20.0/24 ge 24`
///   - seq 20: permit everything
#[derive(Debug)]
pub struct DenyHistoryNet {}

impl ExampleNetwork for DenyHistoryNet {
    fn net() -> Result<NetworkTopology, Error> {
        let mut net = NetworkTopology::new("DenyHistoryNet");

        let main = net.add_router("main", AsId(10))?;
        let e_in = net.add_external_router("in_neighbor", AsId(9))?;
        let e_out = net.add_external_router("out_neighbor", AsId(11))?;

        net.add_peering(main, e_in)?;
        net.add_peering(main, e_out)?;

        let mut import = RouteMap::new("import");
        import.add_item(
            10,
            RouteMapItemBuilder::new()
                .match_prefix(Permit, SymbolicField::parse("21.0.0.0/9", RangeType::Ge)?)
                .build()?,
        );
        import.add_item(
            20,
            RouteMapItemBuilder::new()
                .match_prefix(Permit, SymbolicField::parse("0.0.0.0/0", RangeType::Ge)?)
                .build()?,
        );
        net.set_route_map(main, e_in, Incoming, import)?;

        let mut export = RouteMap::new("export");
        export.add_item(
            10,
            RouteMapItemBuilder::new()
                .match_prefix(Deny, SymbolicField::parse("21.0.20.0/24", RangeType::Ge)?)
                .build()?,
        );
        export.add_item(20, RouteMapItem::default());
        net.set_route_map(main, e_out, Outgoing, export)?;

        Ok(net)
    }

    fn origin() -> &'static str {
        "in_neighbor"
    }
}
