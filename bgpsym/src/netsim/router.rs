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

//! # Internal Router
//!
//! An internal router belongs to the network under verification. It holds the route-maps for all
//! of its peerings, one per neighbor and direction.

use crate::netsim::route_map::{RouteMap, RouteMapDirection};
use crate::netsim::{AsId, RouterId};

use std::collections::HashMap;

/// Internal router with its route-map configuration
#[derive(Debug, Clone, PartialEq)]
pub struct InternalRouter {
    name: String,
    router_id: RouterId,
    as_id: AsId,
    route_maps: HashMap<(RouteMapDirection, RouterId), RouteMap>,
}

impl InternalRouter {
    pub(crate) fn new(name: String, router_id: RouterId, as_id: AsId) -> Self {
        Self { name, router_id, as_id, route_maps: HashMap::new() }
    }

    /// Return the ID of the router
    pub fn router_id(&self) -> RouterId {
        self.router_id
    }

    /// Return the AS ID of the router
    pub fn as_id(&self) -> AsId {
        self.as_id
    }

    /// Return the name of the router
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the route-map applied on the peering with `neighbor` in the given direction.
    pub fn get_route_map(&self, direction: RouteMapDirection, neighbor: RouterId) -> Option<&RouteMap> {
        self.route_maps.get(&(direction, neighbor))
    }

    /// Iterate over all configured route-maps, with their direction and neighbor.
    pub fn route_maps(&self) -> impl Iterator<Item = (RouteMapDirection, RouterId, &RouteMap)> + '_ {
        self.route_maps.iter().map(|((d, n), map)| (*d, *n, map))
    }

    /// Set the route-map, returning the old one if it was already configured.
    pub(crate) fn set_route_map(
        &mut self,
        direction: RouteMapDirection,
        neighbor: RouterId,
        map: RouteMap,
    ) -> Option<RouteMap> {
        self.route_maps.insert((direction, neighbor), map)
    }

    /// Remove the route-map, returning it if it was configured.
    pub(crate) fn remove_route_map(
        &mut self,
        direction: RouteMapDirection,
        neighbor: RouterId,
    ) -> Option<RouteMap> {
        self.route_maps.remove(&(direction, neighbor))
    }
}
