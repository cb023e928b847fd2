//! Incident status and severity enums.

use std::str::FromStr;

use gd_core::CoreError;

// ── IncidentStatus ────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum IncidentStatus {
    Raised,
    Assigned,
    Commuting,
    /// Responder marked complete; awaiting reporter confirmation.
    Resolved,
    Archived,
    Cancelled,
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 6] = [
        IncidentStatus::Raised,
        IncidentStatus::Assigned,
        IncidentStatus::Commuting,
        IncidentStatus::Resolved,
        IncidentStatus::Archived,
        IncidentStatus::Cancelled,
    ];

    /// The transition table.
    pub fn can_transition_to(self, next: IncidentStatus) -> bool {
        use IncidentStatus::*;
        matches!(
            (self, next),
            (Raised, Assigned)
                | (Raised, Cancelled)
                | (Assigned, Commuting)
                | (Commuting, Resolved)
                | (Resolved, Commuting)
                | (Resolved, Archived)
        )
    }

    /// States in which a responder is attached.
    #[inline]
    pub fn has_assignee(self) -> bool {
        matches!(self, IncidentStatus::Assigned | IncidentStatus::Commuting | IncidentStatus::Resolved)
    }

    /// Still live: not yet archived or cancelled.
    #[inline]
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, IncidentStatus::Archived | IncidentStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IncidentStatus::Raised    => "RAISED",
            IncidentStatus::Assigned  => "ASSIGNED",
            IncidentStatus::Commuting => "COMMUTING",
            IncidentStatus::Resolved  => "RESOLVED",
            IncidentStatus::Archived  => "ARCHIVED",
            IncidentStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IncidentStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::Parse(format!("unknown incident status `{s}`")))
    }
}

// ── Severity ──────────────────────────────────────────────────────────────────

/// Reporter- or classifier-assigned urgency.  Orders `Low < … < Critical`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Severity::Low, Severity::Medium, Severity::High, Severity::Critical];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low      => "low",
            Severity::Medium   => "medium",
            Severity::High     => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|sv| sv.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::Parse(format!("unknown severity `{s}`")))
    }
}
