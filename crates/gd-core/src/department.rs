//! Responding department shared by incidents and field units.
//!
//! Rosters are partitioned by department: a waste truck is never dispatched
//! to a fire.

use std::str::FromStr;

use crate::CoreError;

/// The municipal or emergency service an incident belongs to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Department {
    Fire,
    Waste,
    Electricity,
    Infrastructure,
    Water,
}

impl Department {
    pub const ALL: [Department; 5] = [
        Department::Fire,
        Department::Waste,
        Department::Electricity,
        Department::Infrastructure,
        Department::Water,
    ];

    /// Emergency departments dispatch immediately; the rest open a
    /// manual-assignment window first.
    #[inline]
    pub fn is_emergency(self) -> bool {
        matches!(self, Department::Fire)
    }

    /// Duplicate search also covers the eight cells around a report.
    /// Emergency reports only look at their own cell.
    #[inline]
    pub fn scans_neighbor_cells(self) -> bool {
        !self.is_emergency()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Department::Fire           => "fire",
            Department::Waste          => "waste",
            Department::Electricity    => "electricity",
            Department::Infrastructure => "infrastructure",
            Department::Water          => "water",
        }
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::Parse(format!("unknown department `{s}`")))
    }
}
