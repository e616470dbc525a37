//! Database queries for executions.
//!
//! An execution references its test case version immutably: updates may
//! touch status, result, attachment, device, and tester, never the version.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, Statement,
};

use crate::entity::execution;
use crate::error::{AppError, AppResult};
use crate::models::{ExecutionStats, StatusRole};

use super::{clamp_page, DbPool};

/// Query parameters for executions.
#[derive(Debug, Default)]
pub struct QueryExecutionsParams {
    pub run_id: Option<i32>,
    pub device_id: Option<i32>,
    pub test_case_version_id: Option<i32>,
    pub executed_by: Option<i32>,
    pub status_id: Option<i32>,
    pub executed_after: Option<DateTime<Utc>>,
    pub executed_before: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

/// Filters for execution statistics.
#[derive(Debug, Default)]
pub struct StatsFilters {
    pub run_id: Option<i32>,
    pub device_id: Option<i32>,
    pub executed_by: Option<i32>,
    pub project_id: Option<i32>,
}

/// Represents an execution to be inserted.
pub struct NewExecution {
    pub device_id: i32,
    pub run_id: i32,
    pub test_case_version_id: i32,
    pub executed_by: i32,
    pub status_id: i32,
    pub attachment_id: Option<i32>,
    pub actual_result: Option<String>,
    pub executed_at: Option<DateTime<Utc>>,
    pub execution_order: i32,
}

/// Partial update for an execution.
#[derive(Debug, Default)]
pub struct ExecutionUpdate {
    pub device_id: Option<i32>,
    pub executed_by: Option<i32>,
    pub status_id: Option<i32>,
    pub attachment_id: Option<i32>,
    pub actual_result: Option<String>,
    pub executed_at: Option<DateTime<Utc>>,
    pub execution_order: Option<i32>,
    /// Rejected when it differs from the stored value.
    pub test_case_version_id: Option<i32>,
}

impl DbPool {
    pub async fn list_executions(
        &self,
        params: &QueryExecutionsParams,
    ) -> AppResult<(Vec<execution::Model>, u64)> {
        let mut select = execution::Entity::find();
        if let Some(run_id) = params.run_id {
            select = select.filter(execution::Column::RunId.eq(run_id));
        }
        if let Some(device_id) = params.device_id {
            select = select.filter(execution::Column::DeviceId.eq(device_id));
        }
        if let Some(version_id) = params.test_case_version_id {
            select = select.filter(execution::Column::TestCaseVersionId.eq(version_id));
        }
        if let Some(executed_by) = params.executed_by {
            select = select.filter(execution::Column::ExecutedBy.eq(executed_by));
        }
        if let Some(status_id) = params.status_id {
            select = select.filter(execution::Column::StatusId.eq(status_id));
        }
        if let Some(after) = params.executed_after {
            select = select.filter(execution::Column::ExecutedAt.gte(after));
        }
        if let Some(before) = params.executed_before {
            select = select.filter(execution::Column::ExecutedAt.lte(before));
        }

        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(params.limit, params.offset);
        let rows = select
            .order_by_desc(execution::Column::ExecutedAt)
            .order_by_asc(execution::Column::ExecutionOrder)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_execution(&self, id: i32) -> AppResult<Option<execution::Model>> {
        Ok(execution::Entity::find_by_id(id)
            .one(self.connection())
            .await?)
    }

    /// All executions of a run in execution order.
    pub async fn executions_by_run(&self, run_id: i32) -> AppResult<Vec<execution::Model>> {
        Ok(execution::Entity::find()
            .filter(execution::Column::RunId.eq(run_id))
            .order_by_asc(execution::Column::ExecutionOrder)
            .order_by_desc(execution::Column::ExecutedAt)
            .all(self.connection())
            .await?)
    }

    /// Find the unique execution for a `(run, version)` pair, if any.
    pub async fn find_execution_by_run_and_version(
        &self,
        run_id: i32,
        test_case_version_id: i32,
    ) -> AppResult<Option<execution::Model>> {
        Ok(execution::Entity::find()
            .filter(execution::Column::RunId.eq(run_id))
            .filter(execution::Column::TestCaseVersionId.eq(test_case_version_id))
            .one(self.connection())
            .await?)
    }

    /// Insert an execution after validating every reference.
    pub async fn insert_execution(&self, new: NewExecution) -> AppResult<execution::Model> {
        if self.get_device(new.device_id).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Device {} does not exist",
                new.device_id
            )));
        }
        if self.get_run(new.run_id).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Run {} does not exist",
                new.run_id
            )));
        }
        if self.get_version(new.test_case_version_id).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Test case version {} does not exist",
                new.test_case_version_id
            )));
        }
        if self.get_tester(new.executed_by).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Tester {} does not exist",
                new.executed_by
            )));
        }
        let status = self
            .get_status(new.status_id)
            .await?
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Status {} does not exist", new.status_id))
            })?;
        if let Some(attachment_id) = new.attachment_id
            && self.get_attachment(attachment_id).await?.is_none()
        {
            return Err(AppError::InvalidInput(format!(
                "Attachment {} does not exist",
                attachment_id
            )));
        }

        if self
            .find_execution_by_run_and_version(new.run_id, new.test_case_version_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Execution already exists for run {} and test case version {}",
                new.run_id, new.test_case_version_id
            )));
        }

        // Executing with a non-default status implies it happened now.
        let executed_at = match new.executed_at {
            Some(at) => Some(at),
            None if StatusRole::parse(&status.role) != StatusRole::NotRun => Some(Utc::now()),
            None => None,
        };

        let model = execution::ActiveModel {
            device_id: Set(new.device_id),
            run_id: Set(new.run_id),
            test_case_version_id: Set(new.test_case_version_id),
            executed_by: Set(new.executed_by),
            status_id: Set(new.status_id),
            attachment_id: Set(new.attachment_id),
            actual_result: Set(new.actual_result),
            executed_at: Set(executed_at),
            execution_order: Set(new.execution_order),
            ..Default::default()
        };

        model.insert(self.connection()).await.map_err(|e| {
            if e.to_string().contains("executions_run_version_unique") {
                AppError::Conflict(
                    "Duplicate execution for same run and test case version".to_string(),
                )
            } else {
                AppError::from(e)
            }
        })
    }

    /// Apply a partial update; the version reference is immutable.
    pub async fn update_execution(
        &self,
        id: i32,
        update: ExecutionUpdate,
    ) -> AppResult<execution::Model> {
        let existing = self
            .get_execution(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Execution {}", id)))?;

        if let Some(version_id) = update.test_case_version_id
            && version_id != existing.test_case_version_id
        {
            return Err(AppError::Conflict(
                "Cannot change test case version reference after creation".to_string(),
            ));
        }

        if let Some(device_id) = update.device_id
            && self.get_device(device_id).await?.is_none()
        {
            return Err(AppError::InvalidInput(format!(
                "Device {} does not exist",
                device_id
            )));
        }
        if let Some(executed_by) = update.executed_by
            && self.get_tester(executed_by).await?.is_none()
        {
            return Err(AppError::InvalidInput(format!(
                "Tester {} does not exist",
                executed_by
            )));
        }
        if let Some(status_id) = update.status_id
            && self.get_status(status_id).await?.is_none()
        {
            return Err(AppError::InvalidInput(format!(
                "Status {} does not exist",
                status_id
            )));
        }
        if let Some(attachment_id) = update.attachment_id
            && self.get_attachment(attachment_id).await?.is_none()
        {
            return Err(AppError::InvalidInput(format!(
                "Attachment {} does not exist",
                attachment_id
            )));
        }

        let mut active: execution::ActiveModel = existing.into();
        if let Some(device_id) = update.device_id {
            active.device_id = Set(device_id);
        }
        if let Some(executed_by) = update.executed_by {
            active.executed_by = Set(executed_by);
        }
        if let Some(status_id) = update.status_id {
            active.status_id = Set(status_id);
        }
        if update.attachment_id.is_some() {
            active.attachment_id = Set(update.attachment_id);
        }
        if update.actual_result.is_some() {
            active.actual_result = Set(update.actual_result);
        }
        if update.executed_at.is_some() {
            active.executed_at = Set(update.executed_at);
        }
        if let Some(order) = update.execution_order {
            active.execution_order = Set(order);
        }
        Ok(active.update(self.connection()).await?)
    }

    /// Transition an execution's status.
    ///
    /// The first transition away from unexecuted stamps `executed_at`
    /// permanently; later transitions leave it untouched.
    pub async fn update_execution_status(
        &self,
        id: i32,
        status_id: i32,
        actual_result: Option<String>,
        attachment_id: Option<i32>,
    ) -> AppResult<execution::Model> {
        let existing = self
            .get_execution(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Execution {}", id)))?;

        if self.get_status(status_id).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Status {} does not exist",
                status_id
            )));
        }
        if let Some(attachment_id) = attachment_id
            && self.get_attachment(attachment_id).await?.is_none()
        {
            return Err(AppError::InvalidInput(format!(
                "Attachment {} does not exist",
                attachment_id
            )));
        }

        let stamp = existing.executed_at.is_none();
        let mut active: execution::ActiveModel = existing.into();
        active.status_id = Set(status_id);
        if stamp {
            active.executed_at = Set(Some(Utc::now()));
        }
        if actual_result.is_some() {
            active.actual_result = Set(actual_result);
        }
        if attachment_id.is_some() {
            active.attachment_id = Set(attachment_id);
        }
        Ok(active.update(self.connection()).await?)
    }

    /// Move an execution to a different device.
    pub async fn reassign_execution_device(
        &self,
        id: i32,
        new_device_id: i32,
    ) -> AppResult<execution::Model> {
        let existing = self
            .get_execution(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Execution {}", id)))?;

        if self.get_device(new_device_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Device {}", new_device_id)));
        }

        let mut active: execution::ActiveModel = existing.into();
        active.device_id = Set(new_device_id);
        Ok(active.update(self.connection()).await?)
    }

    /// Move an execution to a different tester.
    pub async fn reassign_execution_tester(
        &self,
        id: i32,
        new_tester_id: i32,
    ) -> AppResult<execution::Model> {
        let existing = self
            .get_execution(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Execution {}", id)))?;

        if self.get_tester(new_tester_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Tester {}", new_tester_id)));
        }

        let mut active: execution::ActiveModel = existing.into();
        active.executed_by = Set(new_tester_id);
        Ok(active.update(self.connection()).await?)
    }

    /// Re-sequence a single execution.
    pub async fn update_execution_order(
        &self,
        id: i32,
        execution_order: i32,
    ) -> AppResult<execution::Model> {
        let existing = self
            .get_execution(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Execution {}", id)))?;

        let mut active: execution::ActiveModel = existing.into();
        active.execution_order = Set(execution_order);
        Ok(active.update(self.connection()).await?)
    }

    /// Aggregate execution counts grouped by status, honoring the filters.
    pub async fn execution_stats(&self, filters: &StatsFilters) -> AppResult<ExecutionStats> {
        #[derive(Debug, FromQueryResult)]
        struct CountRow {
            name: String,
            role: String,
            count: i64,
        }

        let mut conditions = Vec::new();
        let mut values: Vec<sea_orm::Value> = Vec::new();

        if let Some(run_id) = filters.run_id {
            values.push(run_id.into());
            conditions.push(format!("e.run_id = ${}", values.len()));
        }
        if let Some(device_id) = filters.device_id {
            values.push(device_id.into());
            conditions.push(format!("e.device_id = ${}", values.len()));
        }
        if let Some(executed_by) = filters.executed_by {
            values.push(executed_by.into());
            conditions.push(format!("e.executed_by = ${}", values.len()));
        }
        if let Some(project_id) = filters.project_id {
            values.push(project_id.into());
            conditions.push(format!("d.project_id = ${}", values.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            r#"
            SELECT s.name, s.role, COUNT(e.id)::BIGINT AS count
            FROM executions e
            INNER JOIN statuses s ON s.id = e.status_id
            INNER JOIN devices d ON d.id = e.device_id
            {}
            GROUP BY s.name, s.role
            "#,
            where_clause
        );

        let rows: Vec<CountRow> = CountRow::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            &sql,
            values,
        ))
        .all(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to aggregate executions: {}", e)))?;

        Ok(ExecutionStats::from_counts(rows.into_iter().map(|r| {
            let role = StatusRole::parse(&r.role);
            (r.name, role, r.count)
        })))
    }
}
