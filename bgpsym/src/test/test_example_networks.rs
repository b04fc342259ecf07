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

//! Test the propagation in all example networks

use crate::example_networks::*;
use crate::netsim::community::{Community, TagState};
use crate::netsim::symbolic_field::{RangeType, SymbolicField};
use crate::netsim::{AsId, RouteAnnouncement};
use maplit::hashset;
use std::collections::HashSet;
use std::net::Ipv4Addr;

fn receive<T: ExampleNetwork>(receiver: &str) -> Vec<RouteAnnouncement> {
    let net = T::net().unwrap();
    let mut result = net.propagate_announcement(T::origin()).unwrap();
    result.remove(receiver).unwrap()
}

fn ge(s: &str) -> SymbolicField {
    SymbolicField::parse(s, RangeType::Ge).unwrap()
}

#[test]
fn simple_net() {
    let result = receive::<SimpleNet>("out_neighbor");
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].ip_prefix().to_string(), "10.0.10.0/24 [24, 32] GE");
    assert!(result[0].ip_prefix_deny().is_empty());
    assert!(result[0].permits_prefix(Ipv4Addr::new(10, 0, 10, 128), 25));
    assert!(!result[0].permits_prefix(Ipv4Addr::new(10, 0, 11, 0), 24));
}

#[test]
fn simple_net_reverse() {
    let net = SimpleNet::net().unwrap();
    let result = net.propagate_announcement("out_neighbor").unwrap();
    let receivers: HashSet<String> = result.keys().cloned().collect();
    assert_eq!(receivers, hashset! {"in_neighbor".to_string()});
    assert_eq!(result["in_neighbor"].len(), 1);
    assert_eq!(*result["in_neighbor"][0].ip_prefix(), SymbolicField::any());
}

#[test]
fn deny_history_net() {
    let result = receive::<DenyHistoryNet>("out_neighbor");
    assert_eq!(result.len(), 2);

    assert_eq!(result[0].ip_prefix(), &ge("21.0.0.0/9"));
    assert_eq!(result[0].ip_prefix_deny(), &[ge("21.0.20.0/24")]);
    assert_eq!(*result[1].ip_prefix(), SymbolicField::any());
    assert_eq!(result[1].ip_prefix_deny(), &[ge("21.0.0.0/9")]);

    let permitted = |addr: Ipv4Addr, len: u8| result.iter().filter(|a| a.permits_prefix(addr, len)).count();
    assert_eq!(permitted(Ipv4Addr::new(21, 0, 20, 0), 24), 0);
    assert_eq!(permitted(Ipv4Addr::new(21, 0, 20, 0), 28), 0);
    assert_eq!(permitted(Ipv4Addr::new(21, 0, 21, 0), 24), 1);
    assert_eq!(permitted(Ipv4Addr::new(21, 0, 20, 0), 16), 1);
    assert_eq!(permitted(Ipv4Addr::new(30, 0, 0, 0), 8), 1);
}

#[test]
fn filter_chain_net() {
    let result = receive::<FilterChainNet>("e2");
    assert_eq!(result.len(), 2);

    assert_eq!(result[0].ip_prefix(), &ge("10.2.0.0/16"));
    assert_eq!(result[0].ip_prefix_deny(), &[ge("10.1.0.0/16")]);
    assert_eq!(result[0].med(), Some(20));

    assert_eq!(result[1].ip_prefix(), &ge("10.0.0.0/8"));
    assert_eq!(result[1].ip_prefix_deny(), &[ge("10.1.0.0/16"), ge("10.2.0.0/16")]);
    assert_eq!(result[1].med(), None);

    for (addr, len, expected) in vec![
        (Ipv4Addr::new(10, 1, 5, 0), 24, 0),
        (Ipv4Addr::new(10, 2, 5, 0), 24, 1),
        (Ipv4Addr::new(10, 3, 5, 0), 24, 1),
        (Ipv4Addr::new(10, 0, 0, 0), 8, 1),
        (Ipv4Addr::new(11, 0, 0, 0), 8, 0),
    ] {
        let permitted = result.iter().filter(|a| a.permits_prefix(addr, len)).count();
        assert_eq!(permitted, expected, "prefix {}/{}", addr, len);
    }
}

#[test]
fn as_path_net() {
    let result = receive::<AsPathNet>("e2");
    assert_eq!(result.len(), 1);
    let as_path = result[0].as_path();
    assert!(as_path.accepts(&[AsId(1), AsId(3), AsId(5)]));
    assert!(as_path.accepts(&[AsId(1), AsId(3)]));
    assert!(!as_path.accepts(&[AsId(1), AsId(3), AsId(4)]));
    assert!(!as_path.accepts(&[AsId(1), AsId(5)]));
    assert!(!as_path.accepts(&[AsId(3), AsId(5)]));
}

#[test]
fn community_net() {
    let result = receive::<CommunityNet>("out_neighbor");
    assert_eq!(result.len(), 3);

    let tag = |v: u16| Community::new(16, v);
    for ann in result.iter() {
        assert_ne!(ann.communities().state(&tag(3)), Some(TagState::Present));
        assert!(
            ann.communities().state(&tag(4)) == Some(TagState::Absent) || ann.med_deny().contains(&100),
            "{}",
            ann
        );
    }

    let preferred: Vec<&RouteAnnouncement> =
        result.iter().filter(|a| a.local_pref() == Some(200)).collect();
    assert_eq!(preferred.len(), 2);
    assert!(preferred
        .iter()
        .all(|a| a.communities().requires_all(&[tag(1), tag(2)])));

    let others: Vec<&RouteAnnouncement> =
        result.iter().filter(|a| a.local_pref().is_none()).collect();
    assert_eq!(others.len(), 1);
    assert_eq!(others[0].communities().state(&tag(3)), Some(TagState::Absent));
    assert_eq!(others[0].communities().state(&tag(4)), Some(TagState::Present));
    assert_eq!(others[0].med_deny(), &[100]);
    assert_eq!(others[0].community_deny(), &[vec![tag(1), tag(2)]]);
}

#[test]
fn triangle_net() {
    let result = receive::<TriangleNet>("e3");
    assert_eq!(result.len(), 2);
    let prefixes: HashSet<String> = result.iter().map(|a| a.ip_prefix().to_string()).collect();
    assert_eq!(
        prefixes,
        hashset! {"20.0.0.0/8 [8, 32] GE".to_string(), "20.1.0.0/16 [16, 32] GE".to_string()}
    );
}
