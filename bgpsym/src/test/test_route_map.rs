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

//! Test route-map items and route-maps on symbolic announcements

use crate::netsim::announcement::{FieldPattern, RouteAnnouncement, RouteAnnouncementField::*};
use crate::netsim::as_path::AsPathSet;
use crate::netsim::community::{Community, CommunityUniverse, TagState};
use crate::netsim::route_map::{RouteMapDirection::*, RouteMapType::*, *};
use crate::netsim::symbolic_field::{RangeType::*, SymbolicField};
use crate::netsim::{AsId, RouteMapError};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::net::Ipv4Addr;
use std::sync::Arc;

fn ann() -> RouteAnnouncement {
    let universe = CommunityUniverse::new((1..=4).map(|v| Community::new(16, v)));
    RouteAnnouncement::new(Arc::new(universe))
}

fn ge(s: &str) -> SymbolicField {
    SymbolicField::parse(s, Ge).unwrap()
}

#[test]
fn match_validation() {
    assert_eq!(
        RouteMapMatch::new(Permit, Med, FieldPattern::Value(10), Ge),
        Err(RouteMapError::UnsupportedRangeType(Med, Ge))
    );
    assert_eq!(
        RouteMapMatch::new(Permit, AsPath, FieldPattern::Address(ge("10.0.0.0/8")), Ge),
        Err(RouteMapError::UnsupportedPattern(AsPath, "prefix"))
    );
    assert_eq!(
        RouteMapMatch::prefix_range(Permit, Med, ge("10.0.0.0/8")),
        Err(RouteMapError::UnsupportedPattern(Med, "prefix"))
    );
    assert!(RouteMapMatch::new(Permit, LocalPref, FieldPattern::Value(10), Equal).is_ok());
    assert!(RouteMapMatch::new(Deny, Communities, FieldPattern::Communities(vec![]), Le).is_ok());

    let m = RouteMapMatch::new(Permit, IpPrefix, FieldPattern::Address(ge("10.0.0.0/8")), Le)
        .unwrap();
    match m.pattern() {
        FieldPattern::Address(p) => {
            assert_eq!(p.range_type(), Le);
            assert_eq!(p.mask().hi, 8);
        }
        p => panic!("unexpected pattern {:?}", p),
    }
}

#[test]
fn duplicate_match() {
    let result = RouteMapItemBuilder::new()
        .match_prefix(Permit, ge("10.0.0.0/8"))
        .match_med(Permit, 10)
        .match_prefix(Deny, ge("10.1.0.0/16"))
        .build();
    assert_eq!(result, Err(RouteMapError::DuplicateMatch(IpPrefix)));
}

#[test]
fn empty_item_permits_everything() {
    let input = ann();
    let ItemResult { result, carry_forward } = RouteMapItem::default().apply(&input).unwrap();
    assert!(result.hit());
    assert!(result.drop_remainder());
    assert!(carry_forward.is_empty());
    assert_eq!(result, input);
}

#[test]
fn conjunction_short_circuit() {
    let item = RouteMapItemBuilder::new()
        .match_prefix(Permit, ge("10.0.0.0/8"))
        .match_med(Permit, 10)
        .set_local_pref(200)
        .build()
        .unwrap();
    let mut input = ann();
    input.med = Some(20);

    let ItemResult { result, carry_forward } = item.apply(&input).unwrap();
    assert!(!result.hit());
    assert!(!result.drop_remainder());
    assert_eq!(result, input);
    assert_eq!(carry_forward, vec![input]);
}

#[test]
fn conjunction_remainders() {
    let item = RouteMapItemBuilder::new()
        .match_prefix(Permit, ge("10.0.0.0/8"))
        .match_med(Permit, 10)
        .set_local_pref(200)
        .build()
        .unwrap();
    let input = ann();

    let ItemResult { result, carry_forward } = item.apply(&input).unwrap();
    assert!(result.hit());
    assert!(!result.drop_remainder());
    assert_eq!(result.ip_prefix(), &ge("10.0.0.0/8"));
    assert_eq!(result.med(), Some(10));
    assert_eq!(result.local_pref(), Some(200));

    // one remainder per match statement, with all other fields untouched
    assert_eq!(carry_forward.len(), 2);
    assert_eq!(carry_forward[0].ip_prefix_deny(), &[ge("10.0.0.0/8")]);
    assert_eq!(carry_forward[0].med(), None);
    assert!(carry_forward[0].med_deny().is_empty());
    assert_eq!(*carry_forward[1].ip_prefix(), SymbolicField::any());
    assert!(carry_forward[1].ip_prefix_deny().is_empty());
    assert_eq!(carry_forward[1].med_deny(), &[10]);
    assert!(carry_forward.iter().all(|a| a.local_pref().is_none()));
}

#[test]
fn deny_match_blocks_item() {
    let item = RouteMapItemBuilder::new()
        .match_prefix(Deny, ge("10.0.0.0/8"))
        .match_med(Permit, 10)
        .set_local_pref(200)
        .build()
        .unwrap();
    let ItemResult { result, carry_forward } = item.apply(&ann()).unwrap();
    assert!(!result.hit());
    assert_eq!(result.local_pref(), None);
    assert_eq!(carry_forward.len(), 2);
}

#[test]
fn actions() {
    let c1 = Community::new(16, 1);
    let c2 = Community::new(16, 2);
    let mut input = ann();
    input.next_hop_deny.push(ge("1.0.0.0/8"));
    input.community_deny.push(vec![c1, c2]);
    input.community_deny.push(vec![Community::new(16, 3), Community::new(16, 4)]);

    let item = RouteMapItemBuilder::new()
        .set_next_hop(Ipv4Addr::new(1, 2, 3, 4))
        .set_med(5)
        .set_communities(vec![c1])
        .prepend_as_path(vec![AsId(10), AsId(10)])
        .build()
        .unwrap();
    let result = item.apply(&input).unwrap().result;

    assert_eq!(*result.next_hop(), SymbolicField::host(Ipv4Addr::new(1, 2, 3, 4)));
    assert!(result.next_hop_deny().is_empty());
    assert_eq!(result.med(), Some(5));
    assert_eq!(result.communities().state(&c1), Some(TagState::Present));
    assert_eq!(result.community_deny(), &[vec![Community::new(16, 3), Community::new(16, 4)]]);
    assert!(result.as_path().accepts(&[AsId(10), AsId(10), AsId(3)]));
    assert!(!result.as_path().accepts(&[AsId(10), AsId(3)]));

    let unknown = RouteMapItemBuilder::new().set_communities(vec![Community::new(1, 1)]).build().unwrap();
    assert_eq!(
        unknown.apply(&input),
        Err(RouteMapError::UnknownCommunity(Community::new(1, 1)))
    );
}

#[test]
fn item_order() {
    let first = RouteMapItemBuilder::new().match_med(Permit, 1).build().unwrap();
    let second = RouteMapItemBuilder::new().match_med(Permit, 2).build().unwrap();
    let last = RouteMapItemBuilder::new().match_med(Permit, 3).build().unwrap();

    let mut map = RouteMap::new("order");
    map.add_item(20, last.clone());
    map.add_item(10, first.clone());
    map.add_item(10, second.clone());

    let items: Vec<(usize, RouteMapItem)> = map.items().cloned().collect();
    assert_eq!(items, vec![(10, first), (10, second), (20, last)]);
}

#[test]
fn empty_map_passes_through() {
    let input = ann();
    assert_eq!(RouteMap::new("empty").apply(&input, Incoming).unwrap(), vec![input]);
}

#[test]
fn single_permit() {
    let mut map = RouteMap::new("import");
    map.add_item(10, RouteMapItemBuilder::new().match_prefix(Permit, ge("10.0.0.0/8")).build().unwrap());
    let result = map.apply(&ann(), Incoming).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].ip_prefix().to_string(), "10.0.0.0/8 [8, 32] GE");
    assert!(result[0].hit());
    assert!(!result[0].drop_remainder());
}

#[test]
fn chained_maps_narrow_lengths() {
    let mut import = RouteMap::new("import");
    import.add_item(10, RouteMapItemBuilder::new().match_prefix(Permit, ge("39.0.0.0/9")).build().unwrap());
    let mut export = RouteMap::new("export");
    export.add_item(
        10,
        RouteMapItemBuilder::new()
            .match_prefix(Permit, SymbolicField::parse("39.0.99.0/25", Le).unwrap())
            .build()
            .unwrap(),
    );

    let imported = import.apply(&ann(), Incoming).unwrap();
    assert_eq!(imported.len(), 1);
    let exported = export.apply(&imported[0], Outgoing).unwrap();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].ip_prefix().to_string(), "39.0.99.0/25 [9, 25] LE");
}

#[test]
fn as_path_filter() {
    let mut import = RouteMap::new("import");
    import.add_item(
        10,
        RouteMapItemBuilder::new()
            .match_as_path(Permit, AsPathSet::from_regex(".*\\W3\\W.*").unwrap())
            .build()
            .unwrap(),
    );
    let mut export = RouteMap::new("export");
    export.add_item(
        10,
        RouteMapItemBuilder::new()
            .match_as_path(Deny, AsPathSet::from_regex(".*\\W4\\W").unwrap())
            .build()
            .unwrap(),
    );
    export.add_item(20, RouteMapItem::default());

    let result: Vec<RouteAnnouncement> = import
        .apply(&ann(), Incoming)
        .unwrap()
        .iter()
        .flat_map(|a| export.apply(a, Outgoing).unwrap())
        .collect();
    assert_eq!(result.len(), 1);
    assert!(result[0].as_path().accepts(&[AsId(3), AsId(5)]));
    assert!(!result[0].as_path().accepts(&[AsId(3), AsId(4)]));
    assert!(!result[0].as_path().accepts(&[AsId(5)]));
}

/// Every concrete prefix must be handled by exactly one item: it is either permitted by exactly
/// one of the resulting announcements, or by none if it is denied.
#[test]
fn coverage() {
    let mut map = RouteMap::new("coverage");
    map.add_item(10, RouteMapItemBuilder::new().match_prefix(Permit, ge("10.0.0.0/8")).build().unwrap());
    map.add_item(20, RouteMapItemBuilder::new().match_prefix(Deny, ge("11.0.0.0/8")).build().unwrap());
    map.add_item(
        30,
        RouteMapItemBuilder::new().match_prefix(Permit, ge("12.0.0.0/8")).set_med(30).build().unwrap(),
    );
    map.add_item(40, RouteMapItemBuilder::new().set_med(40).build().unwrap());

    let result = map.apply(&ann(), Incoming).unwrap();
    assert_eq!(result.len(), 3);

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..2000 {
        let first: u8 = rng.gen_range(9, 14);
        let addr = Ipv4Addr::new(first, rng.gen(), rng.gen(), rng.gen());
        let len: u8 = rng.gen_range(0, 33);
        let permitted: Vec<&RouteAnnouncement> =
            result.iter().filter(|a| a.permits_prefix(addr, len)).collect();

        let denied = first == 11 && len >= 8;
        assert_eq!(permitted.len(), if denied { 0 } else { 1 }, "prefix {}/{}", addr, len);
        if let Some(a) = permitted.first() {
            let expected_med = match (first, len >= 8) {
                (10, true) => None,
                (12, true) => Some(30),
                _ => Some(40),
            };
            assert_eq!(a.med(), expected_med, "prefix {}/{}", addr, len);
        }
    }
}

#[test]
fn deny_history_accumulates() {
    let mut map = RouteMap::new("history");
    map.add_item(10, RouteMapItemBuilder::new().match_prefix(Deny, ge("10.1.0.0/16")).build().unwrap());
    map.add_item(20, RouteMapItemBuilder::new().match_prefix(Permit, ge("10.0.0.0/8")).build().unwrap());
    let result = map.apply(&ann(), Incoming).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].ip_prefix(), &ge("10.0.0.0/8"));
    assert_eq!(result[0].ip_prefix_deny(), &[ge("10.1.0.0/16")]);
}

#[test]
fn multi_field_remainders_overlap() {
    let mut map = RouteMap::new("overlap");
    map.add_item(
        10,
        RouteMapItemBuilder::new()
            .match_prefix(Deny, ge("10.0.0.0/8"))
            .match_med(Permit, 10)
            .build()
            .unwrap(),
    );
    map.add_item(20, RouteMapItem::default());
    let result = map.apply(&ann(), Incoming).unwrap();
    assert_eq!(result.len(), 2);

    // 11.0.0.0/8 with MED 20 is outside of both matches, and both remainders contain it
    let both: Vec<&RouteAnnouncement> = result
        .iter()
        .filter(|a| a.permits_prefix(Ipv4Addr::new(11, 0, 0, 0), 8))
        .filter(|a| a.med().is_none() && !a.med_deny().contains(&20))
        .collect();
    assert_eq!(both.len(), 2);

    // 10.0.0.0/8 with MED 10 matches the deny item, and is rejected by both remainders
    assert!(result
        .iter()
        .all(|a| !a.permits_prefix(Ipv4Addr::new(10, 0, 0, 0), 8) || a.med_deny().contains(&10)));
}
