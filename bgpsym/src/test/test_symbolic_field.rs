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

//! Test the symbolic address fields

use crate::netsim::symbolic_field::{RangeType::*, *};
use crate::netsim::FieldError;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::net::Ipv4Addr;

fn prefix(s: &str, range_type: RangeType) -> SymbolicField {
    SymbolicField::parse(s, range_type).unwrap()
}

fn random_field(rng: &mut StdRng) -> SymbolicField {
    // only a few first octets, such that fields overlap frequently
    let first: u8 = [10, 10, 11, 0][rng.gen_range(0, 4)];
    let addr = Ipv4Addr::new(first, rng.gen(), rng.gen(), rng.gen());
    let len: u8 = rng.gen_range(0, 33);
    let range_type = [Ge, Le, Equal][rng.gen_range(0, 3)];
    SymbolicField::from_prefix(addr, len, range_type).unwrap()
}

#[test]
fn from_prefix() {
    let p = prefix("10.0.0.0/8", Ge);
    assert_eq!(p.mask(), PrefixMask { lo: 8, hi: 32 });
    assert_eq!(p.committed_len(), 8);
    assert_eq!(p.trit(0), Trit::Zero);
    assert_eq!(p.trit(4), Trit::One);
    assert_eq!(p.trit(8), Trit::Wildcard);
    assert_eq!(p.to_trit_string(), format!("00001010{}", "*".repeat(24)));
    assert_eq!(prefix("10.0.0.0/8", Le).mask(), PrefixMask { lo: 0, hi: 8 });
    assert_eq!(prefix("10.0.0.0/8", Equal).mask(), PrefixMask { lo: 8, hi: 8 });

    // host bits are ignored
    assert_eq!(prefix("10.1.2.3/8", Ge), p);
    assert_eq!(p.address(), Ipv4Addr::new(10, 0, 0, 0));

    let any = SymbolicField::any();
    assert_eq!(any.committed_len(), 0);
    assert_eq!(prefix("0.0.0.0/0", Ge), any);
    assert_eq!(any.to_string(), "0.0.0.0/0 [0, 32] GE");
    assert_eq!(SymbolicField::host(Ipv4Addr::new(1, 2, 3, 4)).to_string(), "1.2.3.4/32 [32, 32] EQUAL");
}

#[test]
fn from_prefix_range() {
    let addr = Ipv4Addr::new(10, 0, 0, 0);
    let p = SymbolicField::from_prefix_range(addr, 8, 16, 24).unwrap();
    assert_eq!(p.mask(), PrefixMask { lo: 16, hi: 24 });
    assert_eq!(p.range_type(), Le);
    assert_eq!(SymbolicField::from_prefix_range(addr, 8, 24, 24).unwrap().range_type(), Equal);
    assert_eq!(SymbolicField::from_prefix_range(addr, 8, 16, 32).unwrap().range_type(), Ge);
    assert_eq!(
        SymbolicField::from_prefix_range(addr, 8, 16, 8),
        Err(FieldError::InvalidPrefixRange(16, 8))
    );
    assert_eq!(
        SymbolicField::from_prefix_range(addr, 16, 8, 12),
        Err(FieldError::InvalidPrefixRange(8, 12))
    );
    assert_eq!(
        SymbolicField::from_prefix_range(addr, 8, 8, 33),
        Err(FieldError::InvalidPrefixRange(8, 33))
    );
}

#[test]
fn parse_errors() {
    assert_eq!(
        SymbolicField::parse("10.0.0/8", Ge),
        Err(FieldError::InvalidPrefix(String::from("10.0.0/8")))
    );
    assert_eq!(
        SymbolicField::parse("10.0.0.0/x", Ge),
        Err(FieldError::InvalidPrefix(String::from("10.0.0.0/x")))
    );
    assert_eq!(SymbolicField::parse("10.0.0.0/33", Ge), Err(FieldError::InvalidPrefixLength(33)));
    assert_eq!(SymbolicField::parse("10.0.0.1", Ge).unwrap().committed_len(), 32);
}

#[test]
fn with_range_type() {
    let p = prefix("10.0.0.0/8", Ge).with_range_type(Le);
    assert_eq!(p.mask(), PrefixMask { lo: 0, hi: 8 });
    assert_eq!(p.range_type(), Le);
    assert_eq!(p.committed_len(), 8);
}

#[test]
fn overlap_ge() {
    let p = prefix("10.0.0.0/8", Ge);
    assert_eq!(p.overlap(&SymbolicField::any()).unwrap().to_string(), "10.0.0.0/8 [8, 32] GE");
    assert_eq!(p.overlap(&prefix("11.0.0.0/8", Ge)), None);

    let narrowed = prefix("10.0.10.0/24", Ge).overlap(&p).unwrap();
    assert_eq!(narrowed.to_string(), "10.0.10.0/24 [24, 32] GE");
}

#[test]
fn overlap_le() {
    let imported = prefix("39.0.0.0/9", Ge).overlap(&SymbolicField::any()).unwrap();
    let exported = prefix("39.0.99.0/25", Le).overlap(&imported).unwrap();
    assert_eq!(exported.mask(), PrefixMask { lo: 9, hi: 25 });
    assert_eq!(exported.address(), Ipv4Addr::new(39, 0, 99, 0));
    assert_eq!(exported.range_type(), Le);

    // lengths do not overlap
    assert_eq!(prefix("10.0.0.0/8", Le).overlap(&prefix("10.1.0.0/16", Ge)), None);

    // concrete bits beyond the admissible lengths are cut off
    let long = SymbolicField::from_prefix_range(Ipv4Addr::new(10, 1, 0, 0), 16, 0, 32).unwrap();
    let clipped = prefix("10.0.0.0/8", Le).overlap(&long).unwrap();
    assert_eq!(clipped.to_string(), "10.0.0.0/8 [0, 8] LE");
    assert!(clipped.contains(Ipv4Addr::new(10, 0, 0, 0), 8));

    // a conflict at position 15 only excludes the lengths reaching it
    let result = prefix("10.0.0.0/16", Le).overlap(&prefix("10.1.0.0/16", Le)).unwrap();
    assert_eq!(result.mask(), PrefixMask { lo: 0, hi: 15 });
    assert_eq!(result.committed_len(), 15);
    assert!(result.contains(Ipv4Addr::new(10, 0, 0, 0), 8));
    assert!(!result.contains(Ipv4Addr::new(10, 0, 0, 0), 16));
}

#[test]
fn overlap_equal() {
    let p = prefix("10.0.0.0/16", Equal);
    let result = p.overlap(&SymbolicField::any()).unwrap();
    assert_eq!(result.mask(), PrefixMask { lo: 16, hi: 16 });
    assert_eq!(result.range_type(), Equal);
    assert_eq!(p.overlap(&prefix("10.0.1.0/24", Ge)), None);
    assert_eq!(p.overlap(&prefix("10.0.0.0/8", Le)), None);

    let narrowed = prefix("10.0.0.0/8", Equal).overlap(&prefix("10.1.0.0/16", Le)).unwrap();
    assert_eq!(narrowed.to_string(), "10.0.0.0/8 [8, 8] EQUAL");

    // explicit range with a single length longer than the prefix
    let wide = SymbolicField::from_prefix_range(Ipv4Addr::new(10, 0, 0, 0), 8, 16, 16).unwrap();
    let result = wide.overlap(&SymbolicField::any()).unwrap();
    assert_eq!(result.mask(), PrefixMask { lo: 16, hi: 16 });
    assert!(result.contains(Ipv4Addr::new(10, 7, 0, 0), 16));
}

#[test]
fn superset() {
    let p = prefix("10.0.0.0/8", Ge);
    assert!(p.is_superset_of(&prefix("10.1.0.0/16", Ge)));
    assert!(!p.is_superset_of(&prefix("10.1.0.0/16", Le)));
    assert!(!p.is_superset_of(&SymbolicField::any()));
    assert!(SymbolicField::any().is_superset_of(&p));
    assert!(p.is_superset_of(&p));
}

#[test]
fn contains() {
    let p = prefix("10.0.0.0/8", Ge);
    assert!(p.contains(Ipv4Addr::new(10, 1, 0, 0), 16));
    assert!(p.contains(Ipv4Addr::new(10, 0, 0, 0), 8));
    assert!(!p.contains(Ipv4Addr::new(11, 0, 0, 0), 16));
    assert!(!p.contains(Ipv4Addr::new(10, 0, 0, 0), 4));
    let le = prefix("10.0.0.0/16", Le);
    assert!(le.contains(Ipv4Addr::new(10, 0, 0, 0), 8));
    assert!(!le.contains(Ipv4Addr::new(10, 0, 0, 0), 24));
}

#[test]
fn overlap_properties() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..2000 {
        let a = random_field(&mut rng);
        let b = random_field(&mut rng);

        assert_eq!(a.intersects(&b), b.intersects(&a));
        assert_eq!(a.range_overlap(&b), b.range_overlap(&a));
        assert_eq!(a.overlaps(&b), b.overlaps(&a));
        assert_eq!(a.overlap(&a), Some(a));

        let r = a.overlap(&b);
        if let Some(r) = r {
            assert!(a.overlaps(&b));
            assert!(!r.is_empty());
            assert!(a.is_superset_of(&r), "{} must contain {}", a, r);
            assert!(b.is_superset_of(&r), "{} must contain {}", b, r);
            assert_eq!(r.range_type(), a.range_type());
        }

        // the overlap contains exactly the prefixes of both fields
        for _ in 0..20 {
            let noise = rng.gen::<u32>().checked_shr(rng.gen_range(0, 33)).unwrap_or(0);
            let addr = Ipv4Addr::from(u32::from(a.address()) ^ noise);
            let len: u8 = rng.gen_range(0, 33);
            let in_both = a.contains(addr, len) && b.contains(addr, len);
            let in_overlap = r.map(|r| r.contains(addr, len)).unwrap_or(false);
            assert_eq!(in_both, in_overlap, "{}/{} in {} and {}", addr, len, a, b);
        }
    }
}
