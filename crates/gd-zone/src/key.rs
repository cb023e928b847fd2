//! Zone key and precision types.

use std::fmt;
use std::str::FromStr;

use crate::{ZoneError, ZoneResult};

/// Geohash base-32 alphabet (no `a`, `i`, `l`, `o`).
pub(crate) const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Position of `c` in [`BASE32`], or `None` for characters outside it.
pub(crate) fn base32_index(c: u8) -> Option<u8> {
    BASE32.iter().position(|&b| b == c).map(|i| i as u8)
}

// ── Precision ─────────────────────────────────────────────────────────────────

/// Number of geohash characters in a zone key.
///
/// Each extra character shrinks a cell by 32×.  At 5 characters a cell is
/// roughly 4.9 km × 4.9 km; at 6 characters roughly 1.2 km × 0.6 km.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Precision(u8);

impl Precision {
    pub const MIN: Precision = Precision(1);
    pub const MAX: Precision = Precision(12);

    /// Coarse cells used for responder and incident rosters.
    pub const ROSTER: Precision = Precision(5);

    /// Fine cells used for threat-broadcast markers.
    pub const THREAT: Precision = Precision(6);

    pub fn new(chars: u8) -> ZoneResult<Self> {
        if (Self::MIN.0..=Self::MAX.0).contains(&chars) {
            Ok(Precision(chars))
        } else {
            Err(ZoneError::InvalidPrecision(chars))
        }
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

// ── ZoneKey ───────────────────────────────────────────────────────────────────

/// A geohash cell identifier.
///
/// Always non-empty, at most [`Precision::MAX`] characters, and composed only
/// of the geohash base-32 alphabet.  Lexicographic order groups nearby cells
/// under shared prefixes.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct ZoneKey(String);

impl ZoneKey {
    /// Wrap an already-encoded string.  Only called by the encoder.
    pub(crate) fn from_encoded(s: String) -> Self {
        ZoneKey(s)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters; always a valid [`Precision`].
    #[inline]
    pub fn precision(&self) -> Precision {
        Precision(self.0.len() as u8)
    }

    /// `true` if `self` is `other` or one of its sub-cells.
    pub fn is_within(&self, other: &ZoneKey) -> bool {
        self.0.starts_with(other.as_str())
    }

    /// The enclosing cell at a coarser precision.  Returns `self` unchanged
    /// when `precision` is not coarser.
    pub fn truncate(&self, precision: Precision) -> ZoneKey {
        let n = (precision.get() as usize).min(self.0.len());
        ZoneKey(self.0[..n].to_owned())
    }
}

impl fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ZoneKey {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let valid_len = (1..=Precision::MAX.get() as usize).contains(&lower.len());
        if !valid_len || !lower.bytes().all(|b| base32_index(b).is_some()) {
            return Err(ZoneError::InvalidKey(s.to_owned()));
        }
        Ok(ZoneKey(lower))
    }
}

impl TryFrom<String> for ZoneKey {
    type Error = ZoneError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ZoneKey> for String {
    fn from(k: ZoneKey) -> String {
        k.0
    }
}
