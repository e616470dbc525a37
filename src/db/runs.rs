//! Database queries for runs.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::run;
use crate::error::{AppError, AppResult};

use super::{clamp_page, DbPool};

/// Query parameters for runs.
#[derive(Debug, Default)]
pub struct QueryRunsParams {
    pub project_id: Option<i32>,
    pub name: Option<String>,
    pub started_after: Option<DateTime<Utc>>,
    pub started_before: Option<DateTime<Utc>>,
    /// Some(true) = done_at set, Some(false) = still open.
    pub completed: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

/// Fields for creating or updating a run.
#[derive(Debug, Default)]
pub struct RunFields {
    pub name: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub done_at: Option<DateTime<Utc>>,
    pub test_suite_metadata: Option<String>,
}

/// done_at is only meaningful after started_at.
fn check_run_window(
    started_at: Option<DateTime<Utc>>,
    done_at: Option<DateTime<Utc>>,
) -> AppResult<()> {
    match (started_at, done_at) {
        (None, Some(_)) => Err(AppError::InvalidInput(
            "done_at cannot be set on a run that has not started".to_string(),
        )),
        (Some(start), Some(done)) if done < start => Err(AppError::InvalidInput(
            "done_at cannot precede started_at".to_string(),
        )),
        _ => Ok(()),
    }
}

impl DbPool {
    pub async fn list_runs(&self, params: &QueryRunsParams) -> AppResult<(Vec<run::Model>, u64)> {
        let mut select = run::Entity::find();
        if let Some(project_id) = params.project_id {
            select = select.filter(run::Column::ProjectId.eq(project_id));
        }
        if let Some(ref name) = params.name {
            select = select.filter(Expr::col(run::Column::Name).ilike(format!("%{}%", name)));
        }
        if let Some(after) = params.started_after {
            select = select.filter(run::Column::StartedAt.gte(after));
        }
        if let Some(before) = params.started_before {
            select = select.filter(run::Column::StartedAt.lte(before));
        }
        if let Some(completed) = params.completed {
            select = if completed {
                select.filter(run::Column::DoneAt.is_not_null())
            } else {
                select.filter(run::Column::DoneAt.is_null())
            };
        }

        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(params.limit, params.offset);
        let rows = select
            .order_by_desc(run::Column::StartedAt)
            .order_by_desc(run::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_run(&self, id: i32) -> AppResult<Option<run::Model>> {
        Ok(run::Entity::find_by_id(id).one(self.connection()).await?)
    }

    pub async fn insert_run(&self, project_id: i32, fields: RunFields) -> AppResult<run::Model> {
        if self.get_project(project_id).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Project {} does not exist",
                project_id
            )));
        }
        check_run_window(fields.started_at, fields.done_at)?;

        let model = run::ActiveModel {
            project_id: Set(project_id),
            name: Set(fields.name.unwrap_or_default()),
            started_at: Set(fields.started_at),
            done_at: Set(fields.done_at),
            test_suite_metadata: Set(fields.test_suite_metadata),
            ..Default::default()
        };
        Ok(model.insert(self.connection()).await?)
    }

    pub async fn update_run(&self, id: i32, fields: RunFields) -> AppResult<run::Model> {
        let existing = self
            .get_run(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Run {}", id)))?;

        let started_at = fields.started_at.or(existing.started_at);
        let done_at = fields.done_at.or(existing.done_at);
        check_run_window(started_at, done_at)?;

        let mut active: run::ActiveModel = existing.into();
        if let Some(name) = fields.name {
            active.name = Set(name);
        }
        if fields.started_at.is_some() {
            active.started_at = Set(fields.started_at);
        }
        if fields.done_at.is_some() {
            active.done_at = Set(fields.done_at);
        }
        if fields.test_suite_metadata.is_some() {
            active.test_suite_metadata = Set(fields.test_suite_metadata);
        }
        Ok(active.update(self.connection()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_done_requires_started() {
        let done = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        assert!(check_run_window(None, Some(done)).is_err());
        assert!(check_run_window(None, None).is_ok());
    }

    #[test]
    fn test_done_cannot_precede_started() {
        let start = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2026, 8, 1, 11, 0, 0).unwrap();
        assert!(check_run_window(Some(start), Some(before)).is_err());
        assert!(check_run_window(Some(start), Some(start)).is_ok());
    }
}
