//! Database queries for test cases and their versions.
//!
//! Version numbers are assigned server-side: `max(version) + 1` per test
//! case, starting at 1. The `(test_case_id, version)` unique constraint
//! backs this against races.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::{test_case, test_case_version};
use crate::error::{AppError, AppResult};

use super::{clamp_page, DbPool};

/// Query parameters for test case versions.
#[derive(Debug, Default)]
pub struct QueryVersionsParams {
    pub test_case_id: Option<i32>,
    pub created_by: Option<i32>,
    pub release_ready: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

/// Mutable descriptive fields of a version. The version number and the
/// test case reference are never part of an update.
#[derive(Debug, Default, Clone)]
pub struct VersionFields {
    pub release_ready: Option<bool>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub steps: Option<String>,
    pub expected_result: Option<String>,
}

/// Compute the next version number from the latest existing one.
pub fn next_version_number(latest: Option<i32>) -> i32 {
    latest.map(|v| v + 1).unwrap_or(1)
}

impl DbPool {
    // ---- test cases ----

    pub async fn list_test_cases(
        &self,
        scenario_id: Option<i32>,
        status_set_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<test_case::Model>, u64)> {
        let mut select = test_case::Entity::find();
        if let Some(scenario_id) = scenario_id {
            select = select.filter(test_case::Column::ScenarioId.eq(scenario_id));
        }
        if let Some(status_set_id) = status_set_id {
            select = select.filter(test_case::Column::StatusSetId.eq(status_set_id));
        }

        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(limit, offset);
        let rows = select
            .order_by_asc(test_case::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_test_case(&self, id: i32) -> AppResult<Option<test_case::Model>> {
        Ok(test_case::Entity::find_by_id(id)
            .one(self.connection())
            .await?)
    }

    pub async fn insert_test_case(
        &self,
        scenario_id: i32,
        status_set_id: i32,
    ) -> AppResult<test_case::Model> {
        if self.get_scenario(scenario_id).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Scenario {} does not exist",
                scenario_id
            )));
        }
        if self.get_status_set(status_set_id).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Status set {} does not exist",
                status_set_id
            )));
        }

        let model = test_case::ActiveModel {
            scenario_id: Set(scenario_id),
            status_set_id: Set(status_set_id),
            ..Default::default()
        };
        Ok(model.insert(self.connection()).await?)
    }

    pub async fn update_test_case(
        &self,
        id: i32,
        scenario_id: Option<i32>,
        status_set_id: Option<i32>,
    ) -> AppResult<test_case::Model> {
        let existing = self
            .get_test_case(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))?;

        let mut active: test_case::ActiveModel = existing.into();
        if let Some(scenario_id) = scenario_id {
            if self.get_scenario(scenario_id).await?.is_none() {
                return Err(AppError::InvalidInput(format!(
                    "Scenario {} does not exist",
                    scenario_id
                )));
            }
            active.scenario_id = Set(scenario_id);
        }
        if let Some(status_set_id) = status_set_id {
            if self.get_status_set(status_set_id).await?.is_none() {
                return Err(AppError::InvalidInput(format!(
                    "Status set {} does not exist",
                    status_set_id
                )));
            }
            active.status_set_id = Set(status_set_id);
        }
        Ok(active.update(self.connection()).await?)
    }

    // ---- test case versions ----

    pub async fn list_versions(
        &self,
        params: &QueryVersionsParams,
    ) -> AppResult<(Vec<test_case_version::Model>, u64)> {
        let mut select = test_case_version::Entity::find();
        if let Some(test_case_id) = params.test_case_id {
            select = select.filter(test_case_version::Column::TestCaseId.eq(test_case_id));
        }
        if let Some(created_by) = params.created_by {
            select = select.filter(test_case_version::Column::CreatedBy.eq(created_by));
        }
        if let Some(release_ready) = params.release_ready {
            select = select.filter(test_case_version::Column::ReleaseReady.eq(release_ready));
        }

        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(params.limit, params.offset);
        let rows = select
            .order_by_desc(test_case_version::Column::Version)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_version(&self, id: i32) -> AppResult<Option<test_case_version::Model>> {
        Ok(test_case_version::Entity::find_by_id(id)
            .one(self.connection())
            .await?)
    }

    /// All versions of a test case, newest id first.
    pub async fn versions_for_case_newest_first(
        &self,
        test_case_id: i32,
    ) -> AppResult<Vec<test_case_version::Model>> {
        Ok(test_case_version::Entity::find()
            .filter(test_case_version::Column::TestCaseId.eq(test_case_id))
            .order_by_desc(test_case_version::Column::Id)
            .all(self.connection())
            .await?)
    }

    /// Latest version by version number.
    pub async fn latest_version_for_case(
        &self,
        test_case_id: i32,
    ) -> AppResult<Option<test_case_version::Model>> {
        Ok(test_case_version::Entity::find()
            .filter(test_case_version::Column::TestCaseId.eq(test_case_id))
            .order_by_desc(test_case_version::Column::Version)
            .one(self.connection())
            .await?)
    }

    /// Create a new version; the version number is assigned here.
    pub async fn insert_version(
        &self,
        test_case_id: i32,
        created_by: i32,
        fields: VersionFields,
    ) -> AppResult<test_case_version::Model> {
        if self.get_test_case(test_case_id).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Test case {} does not exist",
                test_case_id
            )));
        }
        if self.get_tester(created_by).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Tester {} does not exist",
                created_by
            )));
        }

        let latest = self.latest_version_for_case(test_case_id).await?;
        let version = next_version_number(latest.map(|v| v.version));

        let model = test_case_version::ActiveModel {
            test_case_id: Set(test_case_id),
            created_by: Set(created_by),
            release_ready: Set(fields.release_ready.unwrap_or(false)),
            version: Set(version),
            name: Set(fields.name),
            description: Set(fields.description),
            steps: Set(fields.steps),
            expected_result: Set(fields.expected_result),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        model.insert(self.connection()).await.map_err(|e| {
            // A concurrent insert may have taken this version number.
            if e.to_string().contains("test_case_versions_case_version_unique") {
                AppError::Conflict(format!(
                    "Version {} already exists for test case {}",
                    version, test_case_id
                ))
            } else {
                AppError::from(e)
            }
        })
    }

    /// Create a new version seeded from the latest one, with optional field
    /// overrides applied on top.
    pub async fn insert_version_from_latest(
        &self,
        test_case_id: i32,
        created_by: i32,
        overrides: VersionFields,
    ) -> AppResult<test_case_version::Model> {
        let latest = self
            .latest_version_for_case(test_case_id)
            .await?
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Test case {} has no versions to derive from",
                    test_case_id
                ))
            })?;

        let fields = VersionFields {
            release_ready: overrides.release_ready.or(Some(latest.release_ready)),
            name: overrides.name.or(latest.name),
            description: overrides.description.or(latest.description),
            steps: overrides.steps.or(latest.steps),
            expected_result: overrides.expected_result.or(latest.expected_result),
        };

        self.insert_version(test_case_id, created_by, fields).await
    }

    /// Update the mutable descriptive fields of a version.
    pub async fn update_version(
        &self,
        id: i32,
        fields: VersionFields,
    ) -> AppResult<test_case_version::Model> {
        let existing = self
            .get_version(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test case version {}", id)))?;

        let mut active: test_case_version::ActiveModel = existing.into();
        if let Some(release_ready) = fields.release_ready {
            active.release_ready = Set(release_ready);
        }
        if fields.name.is_some() {
            active.name = Set(fields.name);
        }
        if fields.description.is_some() {
            active.description = Set(fields.description);
        }
        if fields.steps.is_some() {
            active.steps = Set(fields.steps);
        }
        if fields.expected_result.is_some() {
            active.expected_result = Set(fields.expected_result);
        }
        Ok(active.update(self.connection()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_version_is_one() {
        assert_eq!(next_version_number(None), 1);
    }

    #[test]
    fn test_versions_increment_by_one() {
        assert_eq!(next_version_number(Some(1)), 2);
        assert_eq!(next_version_number(Some(41)), 42);
    }
}
