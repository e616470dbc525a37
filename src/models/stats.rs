//! Aggregate statistics payloads.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::StatusRole;

/// Execution counters grouped by well-known status role, with a by-name
/// breakdown preserved for display.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct ExecutionStats {
    pub total_executions: i64,
    pub passed_executions: i64,
    pub failed_executions: i64,
    pub blocked_executions: i64,
    pub in_progress_executions: i64,
    pub not_run_executions: i64,
    /// Executions in a terminal role (passed, failed, blocked, other).
    pub completed_executions: i64,
    /// Raw counts keyed by status display name.
    pub by_status: HashMap<String, i64>,
}

impl ExecutionStats {
    /// Fold `(display name, role, count)` rows into the aggregate.
    pub fn from_counts(rows: impl IntoIterator<Item = (String, StatusRole, i64)>) -> Self {
        let mut stats = Self::default();
        for (name, role, count) in rows {
            stats.total_executions += count;
            if role.is_terminal() {
                stats.completed_executions += count;
            }
            match role {
                StatusRole::Passed => stats.passed_executions += count,
                StatusRole::Failed => stats.failed_executions += count,
                StatusRole::Blocked => stats.blocked_executions += count,
                StatusRole::InProgress => stats.in_progress_executions += count,
                StatusRole::NotRun => stats.not_run_executions += count,
                StatusRole::Other => {}
            }
            *stats.by_status.entry(name).or_insert(0) += count;
        }
        stats
    }
}

/// Per-run statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct RunStats {
    pub run_id: i32,
    #[serde(flatten)]
    pub executions: ExecutionStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_counts_groups_by_role() {
        let stats = ExecutionStats::from_counts([
            ("Pass".to_string(), StatusRole::Passed, 3),
            ("Fail".to_string(), StatusRole::Failed, 1),
            ("Not Run".to_string(), StatusRole::NotRun, 4),
            ("In Progress".to_string(), StatusRole::InProgress, 2),
        ]);

        assert_eq!(stats.total_executions, 10);
        assert_eq!(stats.passed_executions, 3);
        assert_eq!(stats.failed_executions, 1);
        assert_eq!(stats.not_run_executions, 4);
        assert_eq!(stats.in_progress_executions, 2);
        assert_eq!(stats.completed_executions, 4);
        assert_eq!(stats.by_status["Pass"], 3);
    }

    #[test]
    fn test_renamed_status_still_counts_by_role() {
        // A deployment that renamed "Pass" to "OK" keeps aggregation intact.
        let stats = ExecutionStats::from_counts([("OK".to_string(), StatusRole::Passed, 5)]);
        assert_eq!(stats.passed_executions, 5);
        assert_eq!(stats.by_status["OK"], 5);
    }
}
