//! Execution materialization: ensure exactly one execution per resolved
//! `(test case, version)` pair of a suite within a run.

use std::collections::HashMap;

use tracing::warn;

use crate::db::executions::NewExecution;
use crate::entity::execution;
use crate::error::{AppError, AppResult};

use super::resolver::VersionResolver;
use super::store::{ExecutionStore, SuiteStore};

/// Input for one bulk-materialization call.
#[derive(Debug, Clone)]
pub struct MaterializeRequest {
    pub run_id: i32,
    pub test_suite_id: i32,
    pub device_id: i32,
    pub executed_by: i32,
    pub version_override: Option<HashMap<i32, i32>>,
}

/// Creates or reconciles executions for a run from a test suite.
///
/// The operation is best-effort over the resolved set: a pair whose insert
/// fails (e.g. a lost race on the `(run, version)` uniqueness constraint) is
/// logged and skipped while the batch continues. Resolution errors, by
/// contrast, abort the whole call. The order counter advances on every
/// resolved pair, so a failed pair leaves a gap; re-invoking the materializer
/// re-sequences the surviving executions contiguously.
pub struct ExecutionMaterializer<'a, S: SuiteStore + ExecutionStore> {
    store: &'a S,
}

impl<'a, S: SuiteStore + ExecutionStore> ExecutionMaterializer<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Materialize executions for the request, returning the touched
    /// executions (existing, re-sequenced, or newly created) in processing
    /// order.
    pub async fn materialize(
        &self,
        request: &MaterializeRequest,
    ) -> AppResult<Vec<execution::Model>> {
        if !self.store.run_exists(request.run_id).await? {
            return Err(AppError::NotFound(format!("Run {}", request.run_id)));
        }
        if !self.store.device_exists(request.device_id).await? {
            return Err(AppError::NotFound(format!("Device {}", request.device_id)));
        }
        if !self.store.tester_exists(request.executed_by).await? {
            return Err(AppError::NotFound(format!("Tester {}", request.executed_by)));
        }

        let default_status_id = self.store.default_status_id().await?.ok_or_else(|| {
            AppError::Configuration(
                "No status with role 'not_run' is configured; seed data is incomplete".to_string(),
            )
        })?;

        let resolved = VersionResolver::new(self.store)
            .resolve(request.test_suite_id, request.version_override.as_ref())
            .await?;

        let mut touched = Vec::with_capacity(resolved.len());
        let mut execution_order = 1;

        for pair in &resolved {
            if let Some(existing) = self
                .store
                .find_by_run_and_version(request.run_id, pair.test_case_version_id)
                .await?
            {
                let current = if existing.execution_order != execution_order {
                    self.store
                        .set_execution_order(existing.id, execution_order)
                        .await?
                } else {
                    existing
                };
                touched.push(current);
            } else {
                let new = NewExecution {
                    device_id: request.device_id,
                    run_id: request.run_id,
                    test_case_version_id: pair.test_case_version_id,
                    executed_by: request.executed_by,
                    status_id: default_status_id,
                    attachment_id: None,
                    actual_result: None,
                    executed_at: None,
                    execution_order,
                };
                match self.store.create_execution(new).await {
                    Ok(created) => touched.push(created),
                    Err(e) => {
                        warn!(
                            run_id = request.run_id,
                            test_case_version_id = pair.test_case_version_id,
                            "Skipping execution that failed to create: {}",
                            e
                        );
                    }
                }
            }

            execution_order += 1;
        }

        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::super::store::memory::MemoryStore;
    use super::*;

    fn request(run_id: i32, suite_id: i32) -> MaterializeRequest {
        MaterializeRequest {
            run_id,
            test_suite_id: suite_id,
            device_id: 3,
            executed_by: 1,
            version_override: None,
        }
    }

    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.runs.insert(5);
        store.devices.insert(3);
        store.testers.insert(1);
        store
    }

    #[tokio::test]
    async fn test_creates_executions_for_resolved_pairs() {
        // Suite S = {T1, T2}; T1 has versions 10 and 11, T2 has none.
        let mut store = seeded_store();
        store.add_suite(1, &[1, 2]);
        store.add_versions(1, &[10, 11]);

        let touched = ExecutionMaterializer::new(&store)
            .materialize(&request(5, 1))
            .await
            .unwrap();

        assert_eq!(touched.len(), 1);
        assert_eq!(touched[0].test_case_version_id, 11);
        assert_eq!(touched[0].execution_order, 1);
        assert_eq!(touched[0].status_id, 1);
        assert!(touched[0].executed_at.is_none());
        assert!(touched[0].actual_result.is_none());
    }

    #[tokio::test]
    async fn test_repeat_invocation_is_idempotent() {
        let mut store = seeded_store();
        store.add_suite(1, &[1]);
        store.add_versions(1, &[10, 11]);

        let materializer = ExecutionMaterializer::new(&store);
        let first = materializer.materialize(&request(5, 1)).await.unwrap();
        let second = materializer.materialize(&request(5, 1)).await.unwrap();

        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(second[0].execution_order, 1);
        assert_eq!(store.execution_count(), 1);
    }

    #[tokio::test]
    async fn test_reuses_manual_execution_and_extends_set() {
        // An execution for version 11 exists already; the suite resolves to
        // versions 11 and 20.
        let mut store = seeded_store();
        store.add_suite(1, &[1, 2]);
        store.add_versions(1, &[10, 11]);
        store.add_versions(2, &[20]);
        let existing_id = store.seed_execution(5, 11, 1);

        let touched = ExecutionMaterializer::new(&store)
            .materialize(&request(5, 1))
            .await
            .unwrap();

        assert_eq!(touched.len(), 2);
        assert_eq!(touched[0].id, existing_id);
        assert_eq!(touched[0].execution_order, 1);
        assert_eq!(touched[1].test_case_version_id, 20);
        assert_eq!(touched[1].execution_order, 2);
        assert_eq!(store.execution_count(), 2);
    }

    #[tokio::test]
    async fn test_drifted_order_is_renormalized() {
        let mut store = seeded_store();
        store.add_suite(1, &[1]);
        store.add_versions(1, &[11]);
        store.seed_execution(5, 11, 7);

        let touched = ExecutionMaterializer::new(&store)
            .materialize(&request(5, 1))
            .await
            .unwrap();

        assert_eq!(touched[0].execution_order, 1);
    }

    #[tokio::test]
    async fn test_failed_pair_is_skipped_and_counter_advances() {
        let mut store = seeded_store();
        store.add_suite(1, &[1, 2, 3]);
        store.add_versions(1, &[10]);
        store.add_versions(2, &[20]);
        store.add_versions(3, &[30]);
        store.failing_versions.insert(20);

        let touched = ExecutionMaterializer::new(&store)
            .materialize(&request(5, 1))
            .await
            .unwrap();

        // The failed pair consumed order 2; the batch carried on.
        assert_eq!(touched.len(), 2);
        assert_eq!(touched[0].test_case_version_id, 10);
        assert_eq!(touched[0].execution_order, 1);
        assert_eq!(touched[1].test_case_version_id, 30);
        assert_eq!(touched[1].execution_order, 3);
    }

    #[tokio::test]
    async fn test_missing_run_device_or_tester() {
        let mut store = seeded_store();
        store.add_suite(1, &[1]);
        store.add_versions(1, &[10]);

        let err = ExecutionMaterializer::new(&store)
            .materialize(&request(99, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let mut bad_device = request(5, 1);
        bad_device.device_id = 42;
        let err = ExecutionMaterializer::new(&store)
            .materialize(&bad_device)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let mut bad_tester = request(5, 1);
        bad_tester.executed_by = 42;
        let err = ExecutionMaterializer::new(&store)
            .materialize(&bad_tester)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_default_status_is_configuration_error() {
        let mut store = seeded_store();
        store.add_suite(1, &[1]);
        store.add_versions(1, &[10]);
        store.default_status = None;

        let err = ExecutionMaterializer::new(&store)
            .materialize(&request(5, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_resolution_errors_propagate() {
        let store = seeded_store();

        let err = ExecutionMaterializer::new(&store)
            .materialize(&request(5, 77))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
