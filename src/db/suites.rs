//! Database queries for test suites and suite membership (suitcases).

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entity::{suitcase, test_case, test_case_version, test_suite};
use crate::error::{AppError, AppResult};

use super::{clamp_page, DbPool};

impl DbPool {
    // ---- test suites ----

    pub async fn list_test_suites(
        &self,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<test_suite::Model>, u64)> {
        let select = test_suite::Entity::find();
        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(limit, offset);
        let rows = select
            .order_by_asc(test_suite::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_test_suite(&self, id: i32) -> AppResult<Option<test_suite::Model>> {
        Ok(test_suite::Entity::find_by_id(id)
            .one(self.connection())
            .await?)
    }

    pub async fn insert_test_suite(&self, name: String) -> AppResult<test_suite::Model> {
        let duplicate = test_suite::Entity::find()
            .filter(test_suite::Column::Name.eq(&name))
            .one(self.connection())
            .await?;
        if duplicate.is_some() {
            return Err(AppError::Conflict(format!(
                "Test suite '{}' already exists",
                name
            )));
        }

        let model = test_suite::ActiveModel {
            name: Set(name),
            ..Default::default()
        };
        Ok(model.insert(self.connection()).await?)
    }

    pub async fn update_test_suite(&self, id: i32, name: String) -> AppResult<test_suite::Model> {
        let existing = self
            .get_test_suite(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test suite {}", id)))?;

        let mut active: test_suite::ActiveModel = existing.into();
        active.name = Set(name);
        Ok(active.update(self.connection()).await?)
    }

    // ---- suitcases (membership) ----

    pub async fn list_suitcases(
        &self,
        test_case_id: Option<i32>,
        test_suite_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<suitcase::Model>, u64)> {
        let mut select = suitcase::Entity::find();
        if let Some(test_case_id) = test_case_id {
            select = select.filter(suitcase::Column::TestCaseId.eq(test_case_id));
        }
        if let Some(test_suite_id) = test_suite_id {
            select = select.filter(suitcase::Column::TestSuiteId.eq(test_suite_id));
        }

        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(limit, offset);
        let rows = select
            .order_by_asc(suitcase::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_suitcase(&self, id: i32) -> AppResult<Option<suitcase::Model>> {
        Ok(suitcase::Entity::find_by_id(id)
            .one(self.connection())
            .await?)
    }

    pub async fn insert_suitcase(
        &self,
        test_case_id: i32,
        test_suite_id: i32,
    ) -> AppResult<suitcase::Model> {
        if self.get_test_case(test_case_id).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Test case {} does not exist",
                test_case_id
            )));
        }
        if self.get_test_suite(test_suite_id).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Test suite {} does not exist",
                test_suite_id
            )));
        }

        let duplicate = suitcase::Entity::find()
            .filter(suitcase::Column::TestCaseId.eq(test_case_id))
            .filter(suitcase::Column::TestSuiteId.eq(test_suite_id))
            .one(self.connection())
            .await?;
        if duplicate.is_some() {
            return Err(AppError::Conflict(format!(
                "Test case {} is already in test suite {}",
                test_case_id, test_suite_id
            )));
        }

        let model = suitcase::ActiveModel {
            test_case_id: Set(test_case_id),
            test_suite_id: Set(test_suite_id),
            ..Default::default()
        };
        Ok(model.insert(self.connection()).await?)
    }

    pub async fn delete_suitcase(&self, id: i32) -> AppResult<()> {
        let existing = self
            .get_suitcase(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Suitcase {}", id)))?;

        existing.delete(self.connection()).await?;
        Ok(())
    }

    /// Member test case ids of a suite, in membership insertion order.
    pub async fn member_case_ids(&self, test_suite_id: i32) -> AppResult<Vec<i32>> {
        let rows = suitcase::Entity::find()
            .filter(suitcase::Column::TestSuiteId.eq(test_suite_id))
            .order_by_asc(suitcase::Column::Id)
            .all(self.connection())
            .await?;

        Ok(rows.into_iter().map(|s| s.test_case_id).collect())
    }

    /// Member test cases of a suite paired with their latest version (by
    /// version number), if any.
    pub async fn suite_members_with_latest_version(
        &self,
        test_suite_id: i32,
    ) -> AppResult<Vec<(test_case::Model, Option<test_case_version::Model>)>> {
        if self.get_test_suite(test_suite_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Test suite {}", test_suite_id)));
        }

        let mut members = Vec::new();
        for case_id in self.member_case_ids(test_suite_id).await? {
            let Some(case) = self.get_test_case(case_id).await? else {
                continue;
            };
            let latest = self.latest_version_for_case(case_id).await?;
            members.push((case, latest));
        }

        Ok(members)
    }
}
