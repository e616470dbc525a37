//! Store abstractions consumed by the resolver and materializer.
//!
//! The two core services only see these traits; the SeaORM layer implements
//! them, and tests substitute an in-memory fake.

use async_trait::async_trait;

use crate::db::executions::NewExecution;
use crate::db::DbPool;
use crate::entity::execution;
use crate::error::AppResult;
use crate::models::StatusRole;

/// Read access to suite membership and version history.
#[async_trait]
pub trait SuiteStore: Send + Sync {
    async fn suite_exists(&self, test_suite_id: i32) -> AppResult<bool>;

    /// Member test case ids in membership enumeration order.
    async fn suite_member_case_ids(&self, test_suite_id: i32) -> AppResult<Vec<i32>>;

    /// Version ids of a test case, newest id first.
    async fn version_ids_newest_first(&self, test_case_id: i32) -> AppResult<Vec<i32>>;
}

/// Lookups and mutations needed to materialize executions.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    async fn run_exists(&self, run_id: i32) -> AppResult<bool>;
    async fn device_exists(&self, device_id: i32) -> AppResult<bool>;
    async fn tester_exists(&self, tester_id: i32) -> AppResult<bool>;

    /// Id of the status with role `not_run`, if one is configured.
    async fn default_status_id(&self) -> AppResult<Option<i32>>;

    async fn find_by_run_and_version(
        &self,
        run_id: i32,
        test_case_version_id: i32,
    ) -> AppResult<Option<execution::Model>>;

    async fn set_execution_order(
        &self,
        execution_id: i32,
        execution_order: i32,
    ) -> AppResult<execution::Model>;

    async fn create_execution(&self, new: NewExecution) -> AppResult<execution::Model>;
}

#[async_trait]
impl SuiteStore for DbPool {
    async fn suite_exists(&self, test_suite_id: i32) -> AppResult<bool> {
        Ok(self.get_test_suite(test_suite_id).await?.is_some())
    }

    async fn suite_member_case_ids(&self, test_suite_id: i32) -> AppResult<Vec<i32>> {
        self.member_case_ids(test_suite_id).await
    }

    async fn version_ids_newest_first(&self, test_case_id: i32) -> AppResult<Vec<i32>> {
        let versions = self.versions_for_case_newest_first(test_case_id).await?;
        Ok(versions.into_iter().map(|v| v.id).collect())
    }
}

#[async_trait]
impl ExecutionStore for DbPool {
    async fn run_exists(&self, run_id: i32) -> AppResult<bool> {
        Ok(self.get_run(run_id).await?.is_some())
    }

    async fn device_exists(&self, device_id: i32) -> AppResult<bool> {
        Ok(self.get_device(device_id).await?.is_some())
    }

    async fn tester_exists(&self, tester_id: i32) -> AppResult<bool> {
        Ok(self.get_tester(tester_id).await?.is_some())
    }

    async fn default_status_id(&self) -> AppResult<Option<i32>> {
        Ok(self
            .find_status_by_role(StatusRole::NotRun)
            .await?
            .map(|s| s.id))
    }

    async fn find_by_run_and_version(
        &self,
        run_id: i32,
        test_case_version_id: i32,
    ) -> AppResult<Option<execution::Model>> {
        self.find_execution_by_run_and_version(run_id, test_case_version_id)
            .await
    }

    async fn set_execution_order(
        &self,
        execution_id: i32,
        execution_order: i32,
    ) -> AppResult<execution::Model> {
        self.update_execution_order(execution_id, execution_order)
            .await
    }

    async fn create_execution(&self, new: NewExecution) -> AppResult<execution::Model> {
        self.insert_execution(new).await
    }
}

/// In-memory fake store shared by the resolver and materializer tests.
#[cfg(test)]
pub(crate) mod memory {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::error::AppError;

    #[derive(Default)]
    pub struct MemoryStore {
        pub suites: HashSet<i32>,
        /// suite -> member case ids in membership order
        pub members: HashMap<i32, Vec<i32>>,
        /// case -> version ids (kept newest-id-first by `add_versions`)
        pub versions: HashMap<i32, Vec<i32>>,
        pub runs: HashSet<i32>,
        pub devices: HashSet<i32>,
        pub testers: HashSet<i32>,
        pub default_status: Option<i32>,
        /// version ids whose insert fails, simulating a lost race
        pub failing_versions: HashSet<i32>,
        pub executions: Mutex<Vec<execution::Model>>,
        next_execution_id: AtomicI32,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self {
                default_status: Some(1),
                next_execution_id: AtomicI32::new(1),
                ..Default::default()
            }
        }

        pub fn add_suite(&mut self, suite_id: i32, member_case_ids: &[i32]) {
            self.suites.insert(suite_id);
            self.members.insert(suite_id, member_case_ids.to_vec());
        }

        pub fn add_versions(&mut self, case_id: i32, version_ids: &[i32]) {
            let mut ids = version_ids.to_vec();
            ids.sort_unstable_by(|a, b| b.cmp(a));
            self.versions.insert(case_id, ids);
        }

        pub fn seed_execution(&self, run_id: i32, version_id: i32, order: i32) -> i32 {
            let id = self.next_execution_id.fetch_add(1, Ordering::SeqCst);
            self.executions.lock().unwrap().push(execution::Model {
                id,
                device_id: 0,
                run_id,
                test_case_version_id: version_id,
                executed_by: 0,
                status_id: self.default_status.unwrap_or(1),
                attachment_id: None,
                actual_result: None,
                executed_at: None,
                execution_order: order,
            });
            id
        }

        pub fn execution_count(&self) -> usize {
            self.executions.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SuiteStore for MemoryStore {
        async fn suite_exists(&self, test_suite_id: i32) -> AppResult<bool> {
            Ok(self.suites.contains(&test_suite_id))
        }

        async fn suite_member_case_ids(&self, test_suite_id: i32) -> AppResult<Vec<i32>> {
            Ok(self.members.get(&test_suite_id).cloned().unwrap_or_default())
        }

        async fn version_ids_newest_first(&self, test_case_id: i32) -> AppResult<Vec<i32>> {
            Ok(self.versions.get(&test_case_id).cloned().unwrap_or_default())
        }
    }

    #[async_trait]
    impl ExecutionStore for MemoryStore {
        async fn run_exists(&self, run_id: i32) -> AppResult<bool> {
            Ok(self.runs.contains(&run_id))
        }

        async fn device_exists(&self, device_id: i32) -> AppResult<bool> {
            Ok(self.devices.contains(&device_id))
        }

        async fn tester_exists(&self, tester_id: i32) -> AppResult<bool> {
            Ok(self.testers.contains(&tester_id))
        }

        async fn default_status_id(&self) -> AppResult<Option<i32>> {
            Ok(self.default_status)
        }

        async fn find_by_run_and_version(
            &self,
            run_id: i32,
            test_case_version_id: i32,
        ) -> AppResult<Option<execution::Model>> {
            Ok(self
                .executions
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.run_id == run_id && e.test_case_version_id == test_case_version_id)
                .cloned())
        }

        async fn set_execution_order(
            &self,
            execution_id: i32,
            execution_order: i32,
        ) -> AppResult<execution::Model> {
            let mut executions = self.executions.lock().unwrap();
            let found = executions
                .iter_mut()
                .find(|e| e.id == execution_id)
                .ok_or_else(|| AppError::NotFound(format!("Execution {}", execution_id)))?;
            found.execution_order = execution_order;
            Ok(found.clone())
        }

        async fn create_execution(&self, new: NewExecution) -> AppResult<execution::Model> {
            if self.failing_versions.contains(&new.test_case_version_id) {
                return Err(AppError::Conflict(
                    "Duplicate execution for same run and test case version".to_string(),
                ));
            }

            let mut executions = self.executions.lock().unwrap();
            if executions
                .iter()
                .any(|e| e.run_id == new.run_id && e.test_case_version_id == new.test_case_version_id)
            {
                return Err(AppError::Conflict(
                    "Duplicate execution for same run and test case version".to_string(),
                ));
            }

            let model = execution::Model {
                id: self.next_execution_id.fetch_add(1, Ordering::SeqCst),
                device_id: new.device_id,
                run_id: new.run_id,
                test_case_version_id: new.test_case_version_id,
                executed_by: new.executed_by,
                status_id: new.status_id,
                attachment_id: new.attachment_id,
                actual_result: new.actual_result,
                executed_at: new.executed_at,
                execution_order: new.execution_order,
            };
            executions.push(model.clone());
            Ok(model)
        }
    }
}
