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

//! # Community Network

use super::ExampleNetwork;
use crate::netsim::community::{Community, CommunityUniverse};
use crate::netsim::route_map::{RouteMap, RouteMapDirection::*, RouteMapItemBuilder, RouteMapType::*};
use crate::netsim::{AsId, NetworkTopology};
use crate::Error;

/// # Community Network
///
/// A single internal router `main` (AS 10) between `in_neighbor` and `out_neighbor`, with the
/// communities `16:1` to `16:16` known in the network.
///
/// - `main` imports from `in_neighbor`:
///   - seq 10: permit if both `16:1` and `16:2` are attached, and set the local preference to 200
///   - seq 20: deny if `16:3` is attached
///   - seq 30: permit everything else, and attach `16:4`
/// - `main` exports to `out_neighbor`:
///   - seq 10: deny if `16:4` is attached, and the MED is 100
///   - seq 20: permit everything else
#[derive(Debug)]
pub struct CommunityNet {}

impl ExampleNetwork for CommunityNet {
    fn net() -> Result<NetworkTopology, Error> {
        let mut net = NetworkTopology::new("CommunityNet");
        net.set_community_universe(CommunityUniverse::new((1..=16).map(|v| Community::new(16, v))))?;

        let main = net.add_router("main", AsId(10))?;
        let e_in = net.add_external_router("in_neighbor", AsId(9))?;
        let e_out = net.add_external_router("out_neighbor", AsId(11))?;

        net.add_peering(main, e_in)?;
        net.add_peering(main, e_out)?;

        let mut import = RouteMap::new("import");
        import.add_item(
            10,
            RouteMapItemBuilder::new()
                .match_communities(Permit, vec![Community::new(16, 1), Community::new(16, 2)])
                .set_local_pref(200)
                .build()?,
        );
        import.add_item(
            20,
            RouteMapItemBuilder::new()
                .match_communities(Deny, vec![Community::new(16, 3)])
                .build()?,
        );
        import.add_item(
            30,
            RouteMapItemBuilder::new().set_communities(vec![Community::new(16, 4)]).build()?,
        );
        net.set_route_map(main, e_in, Incoming, import)?;

        let mut export = RouteMap::new("export");
        export.add_item(
            10,
            RouteMapItemBuilder::new()
                .match_communities(Deny, vec![Community::new(16, 4)])
                .match_med(Deny, 100)
                .build()?,
        );
        export.add_item(20, RouteMapItemBuilder::new().build()?);
        net.set_route_map(main, e_out, Outgoing, export)?;

        Ok(net)
    }

    fn origin() -> &'static str {
        "in_neighbor"
    }
}
