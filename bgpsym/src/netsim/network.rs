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

//! # Top-level Network module
//!
//! This module represents the peering topology, stores the route-maps of all internal routers, and
//! propagates symbolic announcements from an external router through the network.

use crate::netsim::announcement::RouteAnnouncement;
use crate::netsim::community::CommunityUniverse;
use crate::netsim::external_router::ExternalRouter;
use crate::netsim::route_map::{RouteMap, RouteMapDirection};
use crate::netsim::router::InternalRouter;
use crate::netsim::types::{NetworkDevice, PeeringGraph};
use crate::netsim::{AsId, NetworkError, RouteMapError, RouterId};

use log::*;
use std::collections::HashMap;
use std::sync::Arc;

static DEFAULT_STOP_AFTER: usize = 10_000;

/// Announcements received by every external router, keyed by the name of the router
pub type PropagationResult = HashMap<String, Vec<RouteAnnouncement>>;

/// Announcement that still needs to be processed by router `to`
#[derive(Debug)]
struct PendingEdge {
    from: RouterId,
    to: RouterId,
    announcement: RouteAnnouncement,
    /// All routers the announcement has traversed, starting with the origin
    path: Vec<RouterId>,
}

/// # Network Topology
///
/// The topology consists of internal and external routers, connected by BGP peerings. Every
/// internal router may have one route-map per peering and direction. Announcements are never sent
/// back to a router that they already traversed, so cyclic topologies terminate.
///
/// ```
/// # use bgpsym::netsim::{NetworkTopology, AsId};
/// # use bgpsym::netsim::route_map::*;
/// # use bgpsym::netsim::symbolic_field::{RangeType, SymbolicField};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut net = NetworkTopology::new("example");
/// let main = net.add_router("main", AsId(10))?;
/// let e_in = net.add_external_router("in_neighbor", AsId(9))?;
/// let e_out = net.add_external_router("out_neighbor", AsId(11))?;
/// net.add_peering(main, e_in)?;
/// net.add_peering(main, e_out)?;
///
/// let mut import = RouteMap::new("import");
/// import.add_item(
///     10,
///     RouteMapItemBuilder::new()
///         .match_prefix(RouteMapType::Permit, SymbolicField::parse("10.0.0.0/8", RangeType::Ge)?)
///         .build()?,
/// );
/// net.set_route_map(main, e_in, RouteMapDirection::Incoming, import)?;
///
/// let result = net.propagate_announcement("in_neighbor")?;
/// assert_eq!(result["out_neighbor"].len(), 1);
/// assert_eq!(result["out_neighbor"][0].ip_prefix().to_prefix_string(), "10.0.0.0/8");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NetworkTopology {
    name: String,
    net: PeeringGraph,
    routers: HashMap<RouterId, InternalRouter>,
    external_routers: HashMap<RouterId, ExternalRouter>,
    names: HashMap<String, RouterId>,
    communities: Arc<CommunityUniverse>,
    stop_after: Option<usize>,
}

impl Default for NetworkTopology {
    fn default() -> Self {
        Self::new("")
    }
}

impl NetworkTopology {
    /// Generate an empty topology
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            net: PeeringGraph::default(),
            routers: HashMap::new(),
            external_routers: HashMap::new(),
            names: HashMap::new(),
            communities: Arc::new(CommunityUniverse::default()),
            stop_after: Some(DEFAULT_STOP_AFTER),
        }
    }

    /// Returns the name of the topology
    pub fn name(&self) -> &str {
        &self.name
    }

    fn reserve_name(&mut self, name: &str) -> Result<RouterId, NetworkError> {
        if self.names.contains_key(name) {
            return Err(NetworkError::DeviceNameAlreadyExists(name.to_string()));
        }
        let router_id = self.net.add_node(());
        self.names.insert(name.to_string(), router_id);
        Ok(router_id)
    }

    /// Add a new internal router to the topology. This function returns the ID of the router,
    /// which can be used to reference it while configuring the network.
    pub fn add_router<S: Into<String>>(&mut self, name: S, as_id: AsId) -> Result<RouterId, NetworkError> {
        let name = name.into();
        let router_id = self.reserve_name(&name)?;
        self.routers.insert(router_id, InternalRouter::new(name, router_id, as_id));
        Ok(router_id)
    }

    /// Add a new external router to the topology. External routers originate announcements and
    /// collect the announcements exported to them, but they never forward anything.
    pub fn add_external_router<S: Into<String>>(
        &mut self,
        name: S,
        as_id: AsId,
    ) -> Result<RouterId, NetworkError> {
        let name = name.into();
        let router_id = self.reserve_name(&name)?;
        self.external_routers.insert(router_id, ExternalRouter::new(name, router_id, as_id));
        Ok(router_id)
    }

    /// Establish a BGP peering between the two routers. Adding the same peering twice has no
    /// effect.
    pub fn add_peering(&mut self, a: RouterId, b: RouterId) -> Result<(), NetworkError> {
        for id in [a, b].iter() {
            if self.get_device(*id).is_none() {
                return Err(NetworkError::DeviceNotFound(*id));
            }
        }
        if self.net.find_edge(a, b).is_none() {
            self.net.add_edge(a, b, ());
        }
        Ok(())
    }

    /// Set the network-wide universe of community tags. This fails if an already configured
    /// route-map references a tag that is not part of the new universe.
    pub fn set_community_universe(&mut self, universe: CommunityUniverse) -> Result<(), NetworkError> {
        for r in self.routers.values() {
            for (_, _, map) in r.route_maps() {
                check_communities(map, &universe)?;
            }
        }
        self.communities = Arc::new(universe);
        Ok(())
    }

    /// Returns the network-wide universe of community tags
    pub fn community_universe(&self) -> &Arc<CommunityUniverse> {
        &self.communities
    }

    /// Apply the route-map on announcements exchanged between the internal `router` and its
    /// `neighbor` in the given direction. Returns the previously configured route-map.
    pub fn set_route_map(
        &mut self,
        router: RouterId,
        neighbor: RouterId,
        direction: RouteMapDirection,
        map: RouteMap,
    ) -> Result<Option<RouteMap>, NetworkError> {
        self.check_session(router, neighbor)?;
        check_communities(&map, &self.communities)?;
        debug!(
            "{}: set route-map {} {} {}",
            self.get_router_name(router)?,
            map.name(),
            direction,
            self.get_router_name(neighbor)?
        );
        let r = self.routers.get_mut(&router).ok_or(NetworkError::DeviceNotFound(router))?;
        Ok(r.set_route_map(direction, neighbor, map))
    }

    /// Remove the route-map from the session, returning it if it was configured.
    pub fn remove_route_map(
        &mut self,
        router: RouterId,
        neighbor: RouterId,
        direction: RouteMapDirection,
    ) -> Result<Option<RouteMap>, NetworkError> {
        self.check_session(router, neighbor)?;
        let r = self.routers.get_mut(&router).ok_or(NetworkError::DeviceNotFound(router))?;
        Ok(r.remove_route_map(direction, neighbor))
    }

    /// Returns the route-map configured on the session, if any.
    pub fn get_route_map(
        &self,
        router: RouterId,
        neighbor: RouterId,
        direction: RouteMapDirection,
    ) -> Result<Option<&RouteMap>, NetworkError> {
        self.check_session(router, neighbor)?;
        let r = self.get_device(router).internal_or(NetworkError::DeviceNotFound(router))?;
        Ok(r.get_route_map(direction, neighbor))
    }

    /// Make sure that `router` is an internal router with a peering to `neighbor`.
    fn check_session(&self, router: RouterId, neighbor: RouterId) -> Result<(), NetworkError> {
        match self.get_device(router) {
            NetworkDevice::InternalRouter(_) => {}
            NetworkDevice::ExternalRouter(_) => return Err(NetworkError::DeviceIsExternalRouter(router)),
            NetworkDevice::None => return Err(NetworkError::DeviceNotFound(router)),
        }
        if self.get_device(neighbor).is_none() {
            return Err(NetworkError::DeviceNotFound(neighbor));
        }
        if self.net.find_edge(router, neighbor).is_none() {
            return Err(NetworkError::RoutersNotConnected(router, neighbor));
        }
        Ok(())
    }

    /// Returns the number of devices in the topology
    pub fn num_devices(&self) -> usize {
        self.routers.len() + self.external_routers.len()
    }

    /// Returns a reference to the network device.
    pub fn get_device(&self, id: RouterId) -> NetworkDevice<'_> {
        match self.routers.get(&id) {
            Some(r) => NetworkDevice::InternalRouter(r),
            None => match self.external_routers.get(&id) {
                Some(r) => NetworkDevice::ExternalRouter(r),
                None => NetworkDevice::None,
            },
        }
    }

    /// Returns a sorted list of all internal router IDs in the network
    pub fn get_routers(&self) -> Vec<RouterId> {
        let mut routers: Vec<RouterId> = self.routers.keys().cloned().collect();
        routers.sort();
        routers
    }

    /// Returns a sorted list of all external router IDs in the network
    pub fn get_external_routers(&self) -> Vec<RouterId> {
        let mut routers: Vec<RouterId> = self.external_routers.keys().cloned().collect();
        routers.sort();
        routers
    }

    /// Returns the sorted list of all peers of the router.
    pub fn neighbors(&self, router: RouterId) -> Vec<RouterId> {
        let mut neighbors: Vec<RouterId> = self.net.neighbors(router).collect();
        neighbors.sort();
        neighbors.dedup();
        neighbors
    }

    /// Returns an iterator over all peerings in the network.
    pub fn peerings(&self) -> impl Iterator<Item = (RouterId, RouterId)> + '_ {
        self.net.edge_indices().filter_map(move |e| self.net.edge_endpoints(e))
    }

    /// Get the RouterID with the given name. If the name was not found, an error is returned.
    pub fn get_router_id(&self, name: impl AsRef<str>) -> Result<RouterId, NetworkError> {
        self.names
            .get(name.as_ref())
            .copied()
            .ok_or_else(|| NetworkError::DeviceNameNotFound(name.as_ref().to_string()))
    }

    /// Returns the name of the router, if the ID was found.
    pub fn get_router_name(&self, router_id: RouterId) -> Result<&str, NetworkError> {
        self.get_device(router_id).name().ok_or(NetworkError::DeviceNotFound(router_id))
    }

    /// Configure the maximum number of propagation steps, after which the propagation is aborted.
    /// If set to `None`, the propagation runs until all announcements are processed.
    pub fn set_stop_after(&mut self, stop_after: Option<usize>) {
        self.stop_after = stop_after;
    }

    /// Propagate a fully symbolic announcement from the external router with the given name, and
    /// return the announcements received by every other external router. External routers that
    /// receive nothing are mapped to an empty list.
    pub fn propagate_announcement(&self, neighbor: &str) -> Result<PropagationResult, NetworkError> {
        let origin = self.get_router_id(neighbor)?;
        let announcement = RouteAnnouncement::new(self.communities.clone());
        self.propagate_from(origin, announcement)
    }

    /// Propagate the announcement from the external router `origin`.
    pub fn propagate_from(
        &self,
        origin: RouterId,
        announcement: RouteAnnouncement,
    ) -> Result<PropagationResult, NetworkError> {
        let received = self.propagate(origin, announcement)?;
        received
            .into_iter()
            .map(|(id, anns)| Ok((self.get_router_name(id)?.to_string(), anns)))
            .collect()
    }

    /// Propagate the announcement from the external router `origin`, with the result keyed by the
    /// ID of the external routers.
    ///
    /// The announcement is sent to every internal router peering with the origin. Each internal
    /// router applies the incoming route-map of the session it received the announcement on, and
    /// the outgoing route-map of every session to a neighbor that the announcement has not yet
    /// traversed. Announcements exported to external routers are collected, and the ones exported
    /// to internal routers are processed further.
    pub fn propagate(
        &self,
        origin: RouterId,
        announcement: RouteAnnouncement,
    ) -> Result<HashMap<RouterId, Vec<RouteAnnouncement>>, NetworkError> {
        match self.get_device(origin) {
            NetworkDevice::ExternalRouter(_) => {}
            NetworkDevice::InternalRouter(_) => return Err(NetworkError::DeviceIsInternalRouter(origin)),
            NetworkDevice::None => return Err(NetworkError::DeviceNotFound(origin)),
        }

        let mut received: HashMap<RouterId, Vec<RouteAnnouncement>> = self
            .external_routers
            .keys()
            .filter(|id| **id != origin)
            .map(|id| (*id, Vec::new()))
            .collect();

        let mut stack: Vec<PendingEdge> = self
            .neighbors(origin)
            .into_iter()
            .rev()
            .filter(|n| self.routers.contains_key(n))
            .map(|to| PendingEdge { from: origin, to, announcement: announcement.clone(), path: vec![origin] })
            .collect();
        if stack.is_empty() {
            return Err(NetworkError::NoIngressRouter(origin));
        }

        info!("Propagating announcement from {}", self.get_router_name(origin)?);
        let mut steps: usize = 0;
        while let Some(PendingEdge { from, to, announcement, mut path }) = stack.pop() {
            steps += 1;
            if let Some(limit) = self.stop_after {
                if steps > limit {
                    warn!("Propagation aborted after {} steps", limit);
                    return Err(NetworkError::PropagationLimitReached(limit));
                }
            }

            let router = self.get_device(to).internal_or(NetworkError::DeviceNotFound(to))?;
            let local = match router.get_route_map(RouteMapDirection::Incoming, from) {
                Some(map) => map.apply(&announcement, RouteMapDirection::Incoming)?,
                None => vec![announcement],
            };
            trace!(
                "{} accepted {} announcement(s) from {}",
                router.name(),
                local.len(),
                self.get_router_name(from)?
            );
            path.push(to);

            for neighbor in self.neighbors(to).into_iter().rev() {
                if path.contains(&neighbor) {
                    if neighbor != from {
                        trace!("{}: not sending back to {:?} on the path", router.name(), neighbor);
                    }
                    continue;
                }
                for ann in local.iter() {
                    let exported = match router.get_route_map(RouteMapDirection::Outgoing, neighbor) {
                        Some(map) => map.apply(ann, RouteMapDirection::Outgoing)?,
                        None => vec![ann.clone()],
                    };
                    if let Some(r) = received.get_mut(&neighbor) {
                        r.extend(exported);
                    } else {
                        stack.extend(exported.into_iter().map(|announcement| PendingEdge {
                            from: to,
                            to: neighbor,
                            announcement,
                            path: path.clone(),
                        }));
                    }
                }
            }
        }

        debug!("Propagation finished after {} steps", steps);
        Ok(received)
    }
}

fn check_communities(map: &RouteMap, universe: &CommunityUniverse) -> Result<(), RouteMapError> {
    for (_, item) in map.items() {
        if let Some(c) = item.communities().find(|c| !universe.contains(c)) {
            return Err(RouteMapError::UnknownCommunity(*c));
        }
    }
    Ok(())
}
