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

//! # Helper (printer) functions for the Network
//! Module containing helper functions to get formatted strings of symbolic announcements,
//! route-maps, and propagation results.

use crate::netsim::announcement::RouteAnnouncement;
use crate::netsim::network::{NetworkTopology, PropagationResult};
use crate::netsim::route_map::RouteMapDirection;
use crate::netsim::symbolic_field::SymbolicField;
use crate::netsim::NetworkError;

use itertools::Itertools;

/// Returns the formatted string for a symbolic announcement. Symbolic scalar values are written as
/// `*`, and deny lists are only shown if they are not empty.
pub fn announcement(ann: &RouteAnnouncement) -> String {
    let mut parts = vec![format!("prefix: {}{}", ann.ip_prefix(), field_deny(ann.ip_prefix_deny()))];
    if *ann.next_hop() != SymbolicField::any() || !ann.next_hop_deny().is_empty() {
        parts.push(format!("next_hop: {}{}", ann.next_hop(), field_deny(ann.next_hop_deny())));
    }
    parts.push(format!("as_path: {}", ann.as_path()));
    parts.push(format!("MED: {}{}", scalar(ann.med()), value_deny(ann.med_deny())));
    parts.push(format!(
        "local_pref: {}{}",
        scalar(ann.local_pref()),
        value_deny(ann.local_pref_deny())
    ));
    let community_deny = if ann.community_deny().is_empty() {
        String::new()
    } else {
        format!(
            " deny [{}]",
            ann.community_deny().iter().map(|d| format!("{{{}}}", d.iter().join(", "))).join(", ")
        )
    };
    parts.push(format!("communities: {}{}", ann.communities(), community_deny));
    parts.join(", ")
}

/// Returns the formatted deny list of an address field, prefixed with a space, or an empty string
/// if the list is empty.
pub fn field_deny(deny: &[SymbolicField]) -> String {
    if deny.is_empty() {
        String::new()
    } else {
        format!(" deny [{}]", deny.iter().join(", "))
    }
}

fn value_deny(deny: &[u32]) -> String {
    if deny.is_empty() {
        String::new()
    } else {
        format!(" deny [{}]", deny.iter().join(", "))
    }
}

fn scalar(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| String::from("*"))
}

/// Returns a formatted string describing all routers, peerings and route-maps of the topology.
pub fn topology(net: &NetworkTopology) -> Result<String, NetworkError> {
    let mut lines = vec![format!("Topology {}", net.name())];
    for r in net.get_routers() {
        let router = net.get_device(r).internal_or(NetworkError::DeviceNotFound(r))?;
        lines.push(format!("  router {} (AS {})", router.name(), router.as_id().0));
        for neighbor in net.neighbors(r) {
            lines.push(format!("    peer {}", net.get_router_name(neighbor)?));
            for direction in [RouteMapDirection::Incoming, RouteMapDirection::Outgoing].iter() {
                if let Some(map) = router.get_route_map(*direction, neighbor) {
                    for line in map.to_string().lines() {
                        lines.push(format!("      {} {}", direction, line));
                    }
                }
            }
        }
    }
    for r in net.get_external_routers() {
        let router = net.get_device(r).external_or(NetworkError::DeviceNotFound(r))?;
        let peers: Vec<&str> =
            net.neighbors(r).into_iter().map(|n| net.get_router_name(n)).collect::<Result<_, _>>()?;
        lines.push(format!(
            "  external {} (AS {}), peers: {}",
            router.name(),
            router.as_id().0,
            peers.join(", ")
        ));
    }
    Ok(lines.join("\n"))
}

/// Returns a formatted string of the propagation result, with the external routers sorted by
/// name.
pub fn propagation_result(origin: &str, result: &PropagationResult) -> String {
    let mut lines = vec![format!("Announcements originated at {}:", origin)];
    for (peer, anns) in result.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
        lines.push(format!("  {} receives {} announcement(s)", peer, anns.len()));
        lines.extend(anns.iter().map(|a| format!("    {}", announcement(a))));
    }
    lines.join("\n")
}
