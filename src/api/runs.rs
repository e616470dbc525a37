//! Handlers for runs.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthenticatedTester;
use crate::db::executions::StatsFilters;
use crate::db::runs::{QueryRunsParams, RunFields};
use crate::db::DbPool;
use crate::entity::run;
use crate::error::{AppError, AppResult};
use crate::models::RunStats;

use super::catalog::ListResponse;
use super::executions::ExecutionResponse;

#[derive(Debug, Serialize, ToSchema)]
pub struct RunResponse {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    pub started_at: Option<DateTime<Utc>>,
    pub done_at: Option<DateTime<Utc>>,
    pub test_suite_metadata: Option<String>,
    /// started and not yet done.
    pub active: bool,
}

impl From<run::Model> for RunResponse {
    fn from(m: run::Model) -> Self {
        let active = m.started_at.is_some() && m.done_at.is_none();
        Self {
            id: m.id,
            project_id: m.project_id,
            name: m.name,
            started_at: m.started_at,
            done_at: m.done_at,
            test_suite_metadata: m.test_suite_metadata,
            active,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRunBody {
    pub project_id: i32,
    pub name: String,
    pub started_at: Option<DateTime<Utc>>,
    pub done_at: Option<DateTime<Utc>>,
    pub test_suite_metadata: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRunBody {
    pub name: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub done_at: Option<DateTime<Utc>>,
    pub test_suite_metadata: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryRunsQuery {
    pub project_id: Option<i32>,
    pub name: Option<String>,
    pub started_after: Option<DateTime<Utc>>,
    pub started_before: Option<DateTime<Utc>>,
    pub completed: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List runs.
#[utoipa::path(
    get,
    path = "/api/v1/runs",
    tag = "Runs",
    responses((status = 200, description = "List of runs"))
)]
pub async fn list_runs(
    pool: web::Data<DbPool>,
    query: web::Query<QueryRunsQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let params = QueryRunsParams {
        project_id: query.project_id,
        name: query.name.clone(),
        started_after: query.started_after,
        started_before: query.started_before,
        completed: query.completed,
        limit: query.limit.unwrap_or(20),
        offset: query.offset.unwrap_or(0),
    };
    let (rows, total) = pool.list_runs(&params).await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows.into_iter().map(RunResponse::from).collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get a run by id.
#[utoipa::path(
    get,
    path = "/api/v1/runs/{id}",
    tag = "Runs",
    responses(
        (status = 200, description = "The run", body = RunResponse),
        (status = 404, description = "Run not found")
    )
)]
pub async fn get_run(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let found = pool
        .get_run(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Run {}", id)))?;

    Ok(HttpResponse::Ok().json(RunResponse::from(found)))
}

/// Create a run.
#[utoipa::path(
    post,
    path = "/api/v1/runs",
    tag = "Runs",
    request_body = CreateRunBody,
    responses((status = 201, description = "Run created", body = RunResponse))
)]
pub async fn create_run(
    pool: web::Data<DbPool>,
    body: web::Json<CreateRunBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let created = pool
        .insert_run(
            body.project_id,
            RunFields {
                name: Some(body.name),
                started_at: body.started_at,
                done_at: body.done_at,
                test_suite_metadata: body.test_suite_metadata,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(RunResponse::from(created)))
}

/// Update a run.
#[utoipa::path(
    patch,
    path = "/api/v1/runs/{id}",
    tag = "Runs",
    request_body = UpdateRunBody,
    responses(
        (status = 200, description = "Run updated", body = RunResponse),
        (status = 404, description = "Run not found")
    )
)]
pub async fn update_run(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateRunBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let updated = pool
        .update_run(
            path.into_inner(),
            RunFields {
                name: body.name,
                started_at: body.started_at,
                done_at: body.done_at,
                test_suite_metadata: body.test_suite_metadata,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(RunResponse::from(updated)))
}

/// Executions of a run in execution order.
#[utoipa::path(
    get,
    path = "/api/v1/runs/{id}/executions",
    tag = "Runs",
    responses(
        (status = 200, description = "Executions of the run"),
        (status = 404, description = "Run not found")
    )
)]
pub async fn get_run_executions(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if pool.get_run(id).await?.is_none() {
        return Err(AppError::NotFound(format!("Run {}", id)));
    }

    let rows = pool.executions_by_run(id).await?;
    let items: Vec<ExecutionResponse> = rows.into_iter().map(ExecutionResponse::from).collect();
    let total = items.len() as i64;

    Ok(HttpResponse::Ok().json(ListResponse { items, total }))
}

/// Aggregate execution statistics for a run.
#[utoipa::path(
    get,
    path = "/api/v1/runs/{id}/stats",
    tag = "Runs",
    responses(
        (status = 200, description = "Run statistics", body = RunStats),
        (status = 404, description = "Run not found")
    )
)]
pub async fn get_run_stats(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if pool.get_run(id).await?.is_none() {
        return Err(AppError::NotFound(format!("Run {}", id)));
    }

    let executions = pool
        .execution_stats(&StatsFilters {
            run_id: Some(id),
            ..Default::default()
        })
        .await?;

    Ok(HttpResponse::Ok().json(RunStats {
        run_id: id,
        executions,
    }))
}

/// Configure run routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/runs")
            .route(web::get().to(list_runs))
            .route(web::post().to(create_run)),
    )
    .service(
        web::resource("/runs/{id}")
            .route(web::get().to(get_run))
            .route(web::patch().to(update_run)),
    )
    .service(web::resource("/runs/{id}/executions").route(web::get().to(get_run_executions)))
    .service(web::resource("/runs/{id}/stats").route(web::get().to(get_run_stats)));
}
