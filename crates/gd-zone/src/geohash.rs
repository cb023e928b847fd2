//! Geohash encoding, decoding, and neighbor lookup.
//!
//! # Bisection rule
//!
//! Each bit halves the current longitude (even bits) or latitude (odd bits)
//! interval.  A value exactly on the midpoint goes to the upper half, so a
//! coordinate on a shared cell edge always encodes to the same cell without
//! special-casing.

use gd_core::{CoreError, Coordinate};

use crate::key::{BASE32, base32_index};
use crate::{Precision, ZoneKey, ZoneResult};

// ── CellBounds ────────────────────────────────────────────────────────────────

/// Axis-aligned extent of a zone cell in degrees.
///
/// Lower edges are inclusive, upper edges exclusive (except at +90/+180,
/// which belong to the last cell).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CellBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl CellBounds {
    /// Geometric center: the clustering anchor returned by [`decode`].
    pub fn center(&self) -> Coordinate {
        Coordinate {
            lat: (self.min_lat + self.max_lat) * 0.5,
            lng: (self.min_lng + self.max_lng) * 0.5,
        }
    }

    /// Cell height in degrees of latitude.
    #[inline]
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Cell width in degrees of longitude.
    #[inline]
    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    /// `true` if `c` falls inside this cell (edges inclusive).
    pub fn contains(&self, c: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&c.lat)
            && (self.min_lng..=self.max_lng).contains(&c.lng)
    }
}

// ── Encode / decode ───────────────────────────────────────────────────────────

/// Encode `c` into a zone key of `precision` characters.
///
/// Pure and deterministic.  Fails only when `c` is out of range, which can
/// happen if it was deserialized rather than built with `Coordinate::new`.
pub fn encode(c: Coordinate, precision: Precision) -> ZoneResult<ZoneKey> {
    if !c.is_valid() {
        return Err(CoreError::InvalidCoordinate { lat: c.lat, lng: c.lng }.into());
    }

    let (mut lat_lo, mut lat_hi) = (-90.0_f64, 90.0_f64);
    let (mut lng_lo, mut lng_hi) = (-180.0_f64, 180.0_f64);

    let mut out = String::with_capacity(precision.get() as usize);
    let mut even = true;
    let mut bits = 0u8;
    let mut idx = 0usize;

    while out.len() < precision.get() as usize {
        let (value, lo, hi) = if even {
            (c.lng, &mut lng_lo, &mut lng_hi)
        } else {
            (c.lat, &mut lat_lo, &mut lat_hi)
        };
        let mid = (*lo + *hi) * 0.5;
        idx <<= 1;
        if value >= mid {
            idx |= 1;
            *lo = mid;
        } else {
            *hi = mid;
        }
        even = !even;

        bits += 1;
        if bits == 5 {
            out.push(BASE32[idx] as char);
            bits = 0;
            idx = 0;
        }
    }

    Ok(ZoneKey::from_encoded(out))
}

/// Exact extent of the cell named by `key`.
pub fn bounds(key: &ZoneKey) -> CellBounds {
    let (mut lat_lo, mut lat_hi) = (-90.0_f64, 90.0_f64);
    let (mut lng_lo, mut lng_hi) = (-180.0_f64, 180.0_f64);
    let mut even = true;

    for ch in key.as_str().bytes() {
        // ZoneKey guarantees the alphabet; a miss would be an internal bug,
        // and treating it as zero keeps this function total.
        let value = base32_index(ch).unwrap_or(0);
        for shift in (0..5).rev() {
            let bit = (value >> shift) & 1;
            let (lo, hi) = if even {
                (&mut lng_lo, &mut lng_hi)
            } else {
                (&mut lat_lo, &mut lat_hi)
            };
            let mid = (*lo + *hi) * 0.5;
            if bit == 1 {
                *lo = mid;
            } else {
                *hi = mid;
            }
            even = !even;
        }
    }

    CellBounds { min_lat: lat_lo, max_lat: lat_hi, min_lng: lng_lo, max_lng: lng_hi }
}

/// Deterministic cell-center coordinate for `key`.
#[inline]
pub fn decode(key: &ZoneKey) -> Coordinate {
    bounds(key).center()
}

// ── Neighbors ─────────────────────────────────────────────────────────────────

/// The up-to-eight cells bordering `key` at the same precision.
///
/// Longitude wraps across the antimeridian; rows beyond a pole are omitted,
/// so polar cells have fewer neighbors.  The result is sorted and never
/// contains `key` itself.
pub fn neighbors(key: &ZoneKey) -> Vec<ZoneKey> {
    let cell = bounds(key);
    let center = cell.center();
    let precision = key.precision();

    let mut out = Vec::with_capacity(8);
    for d_lat in [-1.0_f64, 0.0, 1.0] {
        let lat = center.lat + d_lat * cell.lat_span();
        if !(-90.0..=90.0).contains(&lat) {
            continue;
        }
        for d_lng in [-1.0_f64, 0.0, 1.0] {
            if d_lat == 0.0 && d_lng == 0.0 {
                continue;
            }
            let lng = wrap_lng(center.lng + d_lng * cell.lng_span());
            if let Ok(k) = encode(Coordinate { lat, lng }, precision) {
                if &k != key {
                    out.push(k);
                }
            }
        }
    }
    out.sort();
    out.dedup();
    out
}

/// Wrap a longitude into `[-180, 180)`.
fn wrap_lng(lng: f64) -> f64 {
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}
