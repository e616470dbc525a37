//! Well-known status roles.
//!
//! A `Status` row carries a free-text display name and a `role` tag assigned
//! at seed time. Default-status selection and aggregate counters key off the
//! role, so renaming the display text never breaks them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Semantic role of an execution status, decoupled from its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusRole {
    NotRun,
    InProgress,
    Passed,
    Failed,
    Blocked,
    Other,
}

impl StatusRole {
    /// Database representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotRun => "not_run",
            Self::InProgress => "in_progress",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Blocked => "blocked",
            Self::Other => "other",
        }
    }

    /// Parse a stored role value. Unknown values map to `Other` so that new
    /// roles added by later deployments never break older readers.
    pub fn parse(s: &str) -> Self {
        match s {
            "not_run" => Self::NotRun,
            "in_progress" => Self::InProgress,
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "blocked" => Self::Blocked,
            _ => Self::Other,
        }
    }

    /// Whether the role counts toward "completed" in aggregate statistics.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Blocked | Self::Other)
    }
}

impl std::fmt::Display for StatusRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for role in [
            StatusRole::NotRun,
            StatusRole::InProgress,
            StatusRole::Passed,
            StatusRole::Failed,
            StatusRole::Blocked,
            StatusRole::Other,
        ] {
            assert_eq!(StatusRole::parse(role.as_str()), role);
        }
    }

    #[test]
    fn test_unknown_maps_to_other() {
        assert_eq!(StatusRole::parse("retried"), StatusRole::Other);
    }

    #[test]
    fn test_terminal_roles() {
        assert!(StatusRole::Passed.is_terminal());
        assert!(StatusRole::Blocked.is_terminal());
        assert!(!StatusRole::NotRun.is_terminal());
        assert!(!StatusRole::InProgress.is_terminal());
    }
}
