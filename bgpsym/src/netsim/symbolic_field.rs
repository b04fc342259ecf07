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

//! # Symbolic Address Fields
//!
//! A [`SymbolicField`] represents a set of IPv4 prefixes (or next-hop addresses). Each of the 32
//! positions is a [`Trit`]: a concrete bit, a wildcard, or impossible. Additionally, the field
//! carries the range of admissible prefix lengths (the [`PrefixMask`]), and the [`RangeType`]
//! describing how a prefix list entry treats the lengths (`ge`, `le`, or an exact match).
//!
//! Position `i` is stored as two bits, one telling if the position may be zero, and one telling if
//! the position may be one. Both bits set is a wildcard, none set is impossible. Position 0 is the
//! most significant bit of the address.

use crate::netsim::FieldError;

use std::fmt;
use std::net::Ipv4Addr;

/// Number of positions in an address field
pub const FIELD_WIDTH: u8 = 32;

/// Value of a single position of a [`SymbolicField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trit {
    /// The position must be zero
    Zero,
    /// The position must be one
    One,
    /// The position can take any value
    Wildcard,
    /// The position can take no value; the field is empty
    Impossible,
}

impl fmt::Display for Trit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trit::Zero => write!(f, "0"),
            Trit::One => write!(f, "1"),
            Trit::Wildcard => write!(f, "*"),
            Trit::Impossible => write!(f, "x"),
        }
    }
}

/// How a prefix pattern treats the length of the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeType {
    /// Only prefixes of exactly the same length
    Equal,
    /// Prefixes at least as long as the pattern
    Ge,
    /// Prefixes at most as long as the pattern
    Le,
}

impl fmt::Display for RangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeType::Equal => write!(f, "EQUAL"),
            RangeType::Ge => write!(f, "GE"),
            RangeType::Le => write!(f, "LE"),
        }
    }
}

/// Inclusive range `[lo, hi]` of admissible prefix lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrefixMask {
    /// Shortest admissible length
    pub lo: u8,
    /// Longest admissible length
    pub hi: u8,
}

impl PrefixMask {
    /// Create a new mask, checking that `lo <= hi <= 32`.
    pub fn new(lo: u8, hi: u8) -> Result<Self, FieldError> {
        if lo > hi || hi > FIELD_WIDTH {
            Err(FieldError::InvalidPrefixRange(lo, hi))
        } else {
            Ok(Self { lo, hi })
        }
    }

    /// Range of lengths admissible in both masks, or `None` if there is no such length.
    pub fn overlap(&self, other: &Self) -> Option<Self> {
        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);
        if lo <= hi {
            Some(Self { lo, hi })
        } else {
            None
        }
    }

    /// Returns `true` if every length of `other` is also contained in `self`.
    pub fn contains(&self, other: &Self) -> bool {
        self.lo <= other.lo && other.hi <= self.hi
    }

    /// Returns `true` if the length is admissible.
    pub fn contains_len(&self, len: u8) -> bool {
        self.lo <= len && len <= self.hi
    }
}

impl fmt::Display for PrefixMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

/// # Symbolic IPv4 prefix
///
/// ```
/// # use bgpsym::netsim::symbolic_field::*;
/// # use std::net::Ipv4Addr;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pattern = SymbolicField::parse("10.0.0.0/8", RangeType::Ge)?;
/// assert_eq!(pattern.mask(), PrefixMask { lo: 8, hi: 32 });
/// assert!(pattern.contains(Ipv4Addr::new(10, 1, 0, 0), 16));
/// assert!(!pattern.contains(Ipv4Addr::new(11, 0, 0, 0), 8));
///
/// let narrowed = pattern.overlap(&SymbolicField::any()).unwrap();
/// assert_eq!(narrowed.to_string(), "10.0.0.0/8 [8, 32] GE");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolicField {
    /// Bit `31 - i` is set if position `i` may be zero
    zero: u32,
    /// Bit `31 - i` is set if position `i` may be one
    one: u32,
    mask: PrefixMask,
    range_type: RangeType,
}

impl Default for SymbolicField {
    fn default() -> Self {
        Self::any()
    }
}

/// Bitmask covering the first `len` positions.
fn leading_mask(len: u8) -> u32 {
    u32::MAX.checked_shl((FIELD_WIDTH - len.min(FIELD_WIDTH)) as u32).unwrap_or(0)
}

impl SymbolicField {
    /// Field without any constraint: every address with any length.
    pub fn any() -> Self {
        Self {
            zero: u32::MAX,
            one: u32::MAX,
            mask: PrefixMask { lo: 0, hi: FIELD_WIDTH },
            range_type: RangeType::Ge,
        }
    }

    /// Create the field of a prefix `addr/len`. The first `len` positions are set to the bits of the
    /// address, and the remaining ones are wildcards. The mask is derived from the range type:
    /// `[len, 32]` for `Ge`, `[0, len]` for `Le` and `[len, len]` for `Equal`.
    pub fn from_prefix(addr: Ipv4Addr, len: u8, range_type: RangeType) -> Result<Self, FieldError> {
        if len > FIELD_WIDTH {
            return Err(FieldError::InvalidPrefixLength(len));
        }
        let committed = leading_mask(len);
        let bits = u32::from(addr);
        Ok(Self {
            zero: (!bits & committed) | !committed,
            one: (bits & committed) | !committed,
            mask: mask_for(len, range_type),
            range_type,
        })
    }

    /// Create the field of a prefix `addr/len`, admitting all lengths in `[lo, hi]` (as in a prefix
    /// list entry `addr/len ge lo le hi`). The range type is `Equal` if both bounds are the same,
    /// `Ge` if the upper bound is 32, and `Le` otherwise.
    pub fn from_prefix_range(addr: Ipv4Addr, len: u8, lo: u8, hi: u8) -> Result<Self, FieldError> {
        let mask = PrefixMask::new(lo, hi)?;
        if len > hi {
            return Err(FieldError::InvalidPrefixRange(lo, hi));
        }
        let range_type = if lo == hi {
            RangeType::Equal
        } else if hi == FIELD_WIDTH {
            RangeType::Ge
        } else {
            RangeType::Le
        };
        let mut field = Self::from_prefix(addr, len, range_type)?;
        field.mask = mask;
        Ok(field)
    }

    /// Field containing exactly one host address.
    pub fn host(addr: Ipv4Addr) -> Self {
        let bits = u32::from(addr);
        Self {
            zero: !bits,
            one: bits,
            mask: PrefixMask { lo: FIELD_WIDTH, hi: FIELD_WIDTH },
            range_type: RangeType::Equal,
        }
    }

    /// Parse a prefix in the form `a.b.c.d/n`. A plain address is treated as `a.b.c.d/32`.
    pub fn parse(s: &str, range_type: RangeType) -> Result<Self, FieldError> {
        let err = || FieldError::InvalidPrefix(s.to_string());
        let (addr, len) = match s.find('/') {
            Some(pos) => (&s[..pos], s[pos + 1..].trim().parse::<u8>().map_err(|_| err())?),
            None => (s, FIELD_WIDTH),
        };
        let addr: Ipv4Addr = addr.trim().parse().map_err(|_| err())?;
        Self::from_prefix(addr, len, range_type)
    }

    /// Returns the same prefix, but with the mask recomputed for the new range type.
    pub fn with_range_type(&self, range_type: RangeType) -> Self {
        Self { mask: mask_for(self.committed_len(), range_type), range_type, ..*self }
    }

    /// Returns the mask of admissible prefix lengths.
    pub fn mask(&self) -> PrefixMask {
        self.mask
    }

    /// Returns the range type.
    pub fn range_type(&self) -> RangeType {
        self.range_type
    }

    /// Returns the value at position `pos`, where position 0 is the most significant bit.
    pub fn trit(&self, pos: u8) -> Trit {
        if pos >= FIELD_WIDTH {
            return Trit::Wildcard;
        }
        let bit = 1 << (FIELD_WIDTH - 1 - pos);
        match (self.zero & bit != 0, self.one & bit != 0) {
            (true, true) => Trit::Wildcard,
            (true, false) => Trit::Zero,
            (false, true) => Trit::One,
            (false, false) => Trit::Impossible,
        }
    }

    /// Number of leading positions with a concrete value. All later positions are wildcards.
    pub fn committed_len(&self) -> u8 {
        ((self.zero & self.one).leading_zeros() as u8).min(FIELD_WIDTH)
    }

    /// The address of the field, with all wildcard positions set to zero.
    pub fn address(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.one & !self.zero)
    }

    /// Returns `true` if the field represents no prefix at all.
    pub fn is_empty(&self) -> bool {
        self.zero | self.one != u32::MAX || self.mask.lo > self.mask.hi
    }

    /// Returns `true` if the bits of both fields are compatible, ignoring the prefix lengths.
    pub fn intersects(&self, other: &Self) -> bool {
        (self.zero & other.zero) | (self.one & other.one) == u32::MAX
    }

    /// Range of prefix lengths admissible in both fields.
    pub fn range_overlap(&self, other: &Self) -> Option<PrefixMask> {
        self.mask.overlap(&other.mask)
    }

    /// Returns `true` if there is at least one prefix (address and length) in both fields.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.materialize(other, self.range_type).is_some()
    }

    /// Returns `true` if every prefix of `subject` is matched by `self`, both in the bits and the
    /// prefix lengths. Positions beyond the longest admissible length of `subject` are ignored.
    pub fn is_superset_of(&self, subject: &Self) -> bool {
        let relevant = leading_mask(subject.mask.hi);
        let (zero, one) = (subject.zero & relevant, subject.one & relevant);
        self.zero & zero == zero && self.one & one == one && self.mask.contains(&subject.mask)
    }

    /// Compute the part of `subject` that is matched by `self`, treating `self` as a pattern of a
    /// prefix list entry. The computation depends on the range type of `self`. The result keeps the
    /// range type of the pattern. `None` is returned if nothing of `subject` is matched.
    pub fn overlap(&self, subject: &Self) -> Option<Self> {
        match self.range_type {
            RangeType::Ge => self.overlap_ge(subject),
            RangeType::Le => self.overlap_le(subject),
            RangeType::Equal => self.overlap_equal(subject),
        }
    }

    /// Overlap with a pattern matching all prefixes at least as long as itself.
    pub fn overlap_ge(&self, subject: &Self) -> Option<Self> {
        self.materialize(subject, RangeType::Ge)
    }

    /// Overlap with a pattern matching all prefixes at most as long as itself.
    pub fn overlap_le(&self, subject: &Self) -> Option<Self> {
        self.materialize(subject, RangeType::Le)
    }

    /// Overlap with a pattern matching only prefixes of exactly the same length.
    pub fn overlap_equal(&self, subject: &Self) -> Option<Self> {
        self.materialize(subject, RangeType::Equal).filter(|r| r.mask.lo == r.mask.hi)
    }

    /// Intersection of both fields. Lengths reaching a conflicting position are excluded, and all
    /// positions beyond the longest remaining length become wildcards.
    fn materialize(&self, subject: &Self, range_type: RangeType) -> Option<Self> {
        let zero = self.zero & subject.zero;
        let one = self.one & subject.one;
        let first_conflict = (!(zero | one)).leading_zeros() as u8;
        let mut mask = self.range_overlap(subject)?;
        mask.hi = mask.hi.min(first_conflict);
        if mask.lo > mask.hi {
            return None;
        }
        let wildcards = !leading_mask(mask.hi);
        Some(Self { zero: zero | wildcards, one: one | wildcards, mask, range_type })
    }

    /// Returns `true` if the concrete prefix `addr/len` is part of the field.
    pub fn contains(&self, addr: Ipv4Addr, len: u8) -> bool {
        if !self.mask.contains_len(len) || self.is_empty() {
            return false;
        }
        let relevant = leading_mask(len.min(self.committed_len()));
        let bits = u32::from(addr);
        let concrete_one = self.one & !self.zero;
        (bits ^ concrete_one) & relevant == 0
    }

    /// Format the field as `a.b.c.d/n`, without the mask.
    pub fn to_prefix_string(&self) -> String {
        format!("{}/{}", self.address(), self.committed_len())
    }

    /// Format all 32 positions, with `*` for wildcards and `x` for impossible positions.
    pub fn to_trit_string(&self) -> String {
        (0..FIELD_WIDTH).map(|i| self.trit(i).to_string()).collect()
    }
}

fn mask_for(len: u8, range_type: RangeType) -> PrefixMask {
    match range_type {
        RangeType::Ge => PrefixMask { lo: len, hi: FIELD_WIDTH },
        RangeType::Le => PrefixMask { lo: 0, hi: len },
        RangeType::Equal => PrefixMask { lo: len, hi: len },
    }
}

impl fmt::Display for SymbolicField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "<empty>")
        } else {
            write!(f, "{} {} {}", self.to_prefix_string(), self.mask, self.range_type)
        }
    }
}

/// Returns `true` if the field is entirely covered by one of the deny entries, meaning that every
/// prefix it stands for was already rejected earlier.
pub(crate) fn covered_by(field: &SymbolicField, deny: &[SymbolicField]) -> bool {
    deny.iter().any(|d| d.is_superset_of(field))
}
