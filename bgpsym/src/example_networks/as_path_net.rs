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

//! # AS-Path Network

use super::ExampleNetwork;
use crate::netsim::as_path::AsPathSet;
use crate::netsim::route_map::{
    RouteMap, RouteMapDirection::*, RouteMapItem, RouteMapItemBuilder, RouteMapType::*,
};
use crate::netsim::{AsId, NetworkTopology};
use crate::Error;

/// # AS-Path Network
///
/// A single internal router `r1` filtering on the AS path:
///
/// ```text
/// e1 ---> r1 ---> e2
/// ```
///
/// - `r1` imports from `e1` only paths containing AS 3, and prepends its own AS.
/// - `r1` exports to `e2`:
///   - seq 10: deny paths ending with AS 4
///   - seq 20: permit everything
#[derive(Debug)]
pub struct AsPathNet {}

impl ExampleNetwork for AsPathNet {
    fn net() -> Result<NetworkTopology, Error> {
        let mut net = NetworkTopology::new("AsPathNet");

        let r1 = net.add_router("r1", AsId(1))?;
        let e1 = net.add_external_router("e1", AsId(2))?;
        let e2 = net.add_external_router("e2", AsId(5))?;

        net.add_peering(e1, r1)?;
        net.add_peering(r1, e2)?;

        let mut import = RouteMap::new("import");
        import.add_item(
            10,
            RouteMapItemBuilder::new()
                .match_as_path(Permit, AsPathSet::from_regex(".*\\W3\\W.*")?)
                .prepend_as_path(vec![AsId(1)])
                .build()?,
        );
        net.set_route_map(r1, e1, Incoming, import)?;

        let mut export = RouteMap::new("export");
        export.add_item(
            10,
            RouteMapItemBuilder::new()
                .match_as_path(Deny, AsPathSet::from_regex(".*\\W4\\W")?)
                .build()?,
        );
        export.add_item(20, RouteMapItem::default());
        net.set_route_map(r1, e2, Outgoing, export)?;

        Ok(net)
    }

    fn origin() -> &'static str {
        "e1"
    }
}
