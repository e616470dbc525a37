//! Handlers for executions, including bulk materialization from a test
//! suite, status transitions, and reassignment.

use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{self, AuthenticatedTester};
use crate::db::executions::{
    ExecutionUpdate, NewExecution, QueryExecutionsParams, StatsFilters,
};
use crate::db::DbPool;
use crate::entity::execution;
use crate::error::{AppError, AppResult};
use crate::models::ExecutionStats;
use crate::services::{ExecutionMaterializer, MaterializeRequest};

use super::catalog::ListResponse;

#[derive(Debug, Serialize, ToSchema)]
pub struct ExecutionResponse {
    pub id: i32,
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

impl From<execution::Model> for ExecutionResponse {
    fn from(m: execution::Model) -> Self {
        Self {
            id: m.id,
            device_id: m.device_id,
            run_id: m.run_id,
            test_case_version_id: m.test_case_version_id,
            executed_by: m.executed_by,
            status_id: m.status_id,
            attachment_id: m.attachment_id,
            actual_result: m.actual_result,
            executed_at: m.executed_at,
            execution_order: m.execution_order,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryExecutionsQuery {
    pub run_id: Option<i32>,
    pub device_id: Option<i32>,
    pub test_case_version_id: Option<i32>,
    pub executed_by: Option<i32>,
    pub status_id: Option<i32>,
    pub executed_after: Option<DateTime<Utc>>,
    pub executed_before: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateExecutionBody {
    pub device_id: i32,
    pub run_id: i32,
    pub test_case_version_id: i32,
    /// Defaults to the caller.
    pub executed_by: Option<i32>,
    pub status_id: i32,
    pub attachment_id: Option<i32>,
    pub actual_result: Option<String>,
    pub executed_at: Option<DateTime<Utc>>,
    pub execution_order: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateExecutionBody {
    pub device_id: Option<i32>,
    pub executed_by: Option<i32>,
    pub status_id: Option<i32>,
    pub attachment_id: Option<i32>,
    pub actual_result: Option<String>,
    pub executed_at: Option<DateTime<Utc>>,
    pub execution_order: Option<i32>,
    /// Present only to be rejected when it differs from the stored value.
    pub test_case_version_id: Option<i32>,
}

/// Body for bulk materialization from a test suite.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkCreateBody {
    pub run_id: i32,
    pub test_suite_id: i32,
    pub device_id: i32,
    /// Per-test-case version override: test_case_id -> test_case_version_id.
    pub version_override: Option<HashMap<i32, i32>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusTransitionBody {
    pub status_id: i32,
    pub actual_result: Option<String>,
    pub attachment_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReassignDeviceBody {
    pub device_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReassignTesterBody {
    pub tester_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatsQuery {
    pub run_id: Option<i32>,
    pub device_id: Option<i32>,
    pub executed_by: Option<i32>,
    pub project_id: Option<i32>,
}

/// List executions.
#[utoipa::path(
    get,
    path = "/api/v1/executions",
    tag = "Executions",
    responses((status = 200, description = "List of executions"))
)]
pub async fn list_executions(
    pool: web::Data<DbPool>,
    query: web::Query<QueryExecutionsQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let params = QueryExecutionsParams {
        run_id: query.run_id,
        device_id: query.device_id,
        test_case_version_id: query.test_case_version_id,
        executed_by: query.executed_by,
        status_id: query.status_id,
        executed_after: query.executed_after,
        executed_before: query.executed_before,
        limit: query.limit.unwrap_or(20),
        offset: query.offset.unwrap_or(0),
    };
    let (rows, total) = pool.list_executions(&params).await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(ExecutionResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get an execution by id.
#[utoipa::path(
    get,
    path = "/api/v1/executions/{id}",
    tag = "Executions",
    responses(
        (status = 200, description = "The execution", body = ExecutionResponse),
        (status = 404, description = "Execution not found")
    )
)]
pub async fn get_execution(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let found = pool
        .get_execution(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Execution {}", id)))?;

    Ok(HttpResponse::Ok().json(ExecutionResponse::from(found)))
}

/// Create a single execution manually.
#[utoipa::path(
    post,
    path = "/api/v1/executions",
    tag = "Executions",
    request_body = CreateExecutionBody,
    responses(
        (status = 201, description = "Execution created", body = ExecutionResponse),
        (status = 409, description = "Execution already exists for this run and version")
    )
)]
pub async fn create_execution(
    pool: web::Data<DbPool>,
    body: web::Json<CreateExecutionBody>,
    caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let created = pool
        .insert_execution(NewExecution {
            device_id: body.device_id,
            run_id: body.run_id,
            test_case_version_id: body.test_case_version_id,
            executed_by: body.executed_by.unwrap_or(caller.tester_id),
            status_id: body.status_id,
            attachment_id: body.attachment_id,
            actual_result: body.actual_result,
            executed_at: body.executed_at,
            execution_order: body.execution_order.unwrap_or(1),
        })
        .await?;

    Ok(HttpResponse::Created().json(ExecutionResponse::from(created)))
}

/// Update an execution. The version reference is immutable.
#[utoipa::path(
    patch,
    path = "/api/v1/executions/{id}",
    tag = "Executions",
    request_body = UpdateExecutionBody,
    responses(
        (status = 200, description = "Execution updated", body = ExecutionResponse),
        (status = 404, description = "Execution not found"),
        (status = 409, description = "Attempt to change the version reference")
    )
)]
pub async fn update_execution(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateExecutionBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let updated = pool
        .update_execution(
            path.into_inner(),
            ExecutionUpdate {
                device_id: body.device_id,
                executed_by: body.executed_by,
                status_id: body.status_id,
                attachment_id: body.attachment_id,
                actual_result: body.actual_result,
                executed_at: body.executed_at,
                execution_order: body.execution_order,
                test_case_version_id: body.test_case_version_id,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ExecutionResponse::from(updated)))
}

/// Materialize executions for every member of a test suite within a run.
#[utoipa::path(
    post,
    path = "/api/v1/executions/bulk-create-from-test-suite",
    tag = "Executions",
    request_body = BulkCreateBody,
    responses(
        (status = 201, description = "Executions materialized"),
        (status = 400, description = "Empty suite or invalid input"),
        (status = 404, description = "Run, device, tester, or suite not found")
    )
)]
pub async fn bulk_create_from_test_suite(
    pool: web::Data<DbPool>,
    body: web::Json<BulkCreateBody>,
    caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    let request = MaterializeRequest {
        run_id: body.run_id,
        test_suite_id: body.test_suite_id,
        device_id: body.device_id,
        executed_by: caller.tester_id,
        version_override: body.version_override,
    };

    let touched = ExecutionMaterializer::new(pool.get_ref())
        .materialize(&request)
        .await?;

    let items: Vec<ExecutionResponse> = touched.into_iter().map(ExecutionResponse::from).collect();
    let total = items.len() as i64;

    Ok(HttpResponse::Created().json(ListResponse { items, total }))
}

/// Transition an execution's status.
#[utoipa::path(
    patch,
    path = "/api/v1/executions/{id}/status",
    tag = "Executions",
    request_body = StatusTransitionBody,
    responses(
        (status = 200, description = "Execution updated", body = ExecutionResponse),
        (status = 400, description = "Invalid status or attachment id"),
        (status = 404, description = "Execution not found")
    )
)]
pub async fn transition_status(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<StatusTransitionBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let updated = pool
        .update_execution_status(
            path.into_inner(),
            body.status_id,
            body.actual_result,
            body.attachment_id,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ExecutionResponse::from(updated)))
}

/// Reassign an execution to a different device. Admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/executions/{id}/reassign-device",
    tag = "Executions",
    request_body = ReassignDeviceBody,
    responses(
        (status = 200, description = "Execution updated", body = ExecutionResponse),
        (status = 403, description = "Admin tester type required"),
        (status = 404, description = "Execution or device not found")
    )
)]
pub async fn reassign_device(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<ReassignDeviceBody>,
    caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    auth::require_admin(&pool, &caller).await?;

    let updated = pool
        .reassign_execution_device(path.into_inner(), body.device_id)
        .await?;
    Ok(HttpResponse::Ok().json(ExecutionResponse::from(updated)))
}

/// Reassign an execution to a different tester. Admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/executions/{id}/reassign-tester",
    tag = "Executions",
    request_body = ReassignTesterBody,
    responses(
        (status = 200, description = "Execution updated", body = ExecutionResponse),
        (status = 403, description = "Admin tester type required"),
        (status = 404, description = "Execution or tester not found")
    )
)]
pub async fn reassign_tester(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<ReassignTesterBody>,
    caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    auth::require_admin(&pool, &caller).await?;

    let updated = pool
        .reassign_execution_tester(path.into_inner(), body.tester_id)
        .await?;
    Ok(HttpResponse::Ok().json(ExecutionResponse::from(updated)))
}

/// Aggregate execution statistics.
#[utoipa::path(
    get,
    path = "/api/v1/executions/stats",
    tag = "Executions",
    responses((status = 200, description = "Execution statistics", body = ExecutionStats))
)]
pub async fn get_execution_stats(
    pool: web::Data<DbPool>,
    query: web::Query<StatsQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let stats = pool
        .execution_stats(&StatsFilters {
            run_id: query.run_id,
            device_id: query.device_id,
            executed_by: query.executed_by,
            project_id: query.project_id,
        })
        .await?;

    Ok(HttpResponse::Ok().json(stats))
}

/// Configure execution routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/executions")
            .route(web::get().to(list_executions))
            .route(web::post().to(create_execution)),
    )
    .service(
        web::resource("/executions/bulk-create-from-test-suite")
            .route(web::post().to(bulk_create_from_test_suite)),
    )
    .service(web::resource("/executions/stats").route(web::get().to(get_execution_stats)))
    .service(
        web::resource("/executions/{id}")
            .route(web::get().to(get_execution))
            .route(web::patch().to(update_execution)),
    )
    .service(web::resource("/executions/{id}/status").route(web::patch().to(transition_status)))
    .service(
        web::resource("/executions/{id}/reassign-device").route(web::patch().to(reassign_device)),
    )
    .service(
        web::resource("/executions/{id}/reassign-tester").route(web::patch().to(reassign_tester)),
    );
}
