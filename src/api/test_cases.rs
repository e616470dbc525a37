//! Handlers for test cases and their versions.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthenticatedTester;
use crate::db::test_cases::{QueryVersionsParams, VersionFields};
use crate::db::DbPool;
use crate::entity::{test_case, test_case_version};
use crate::error::{AppError, AppResult};

use super::catalog::ListResponse;

#[derive(Debug, Serialize, ToSchema)]
pub struct TestCaseResponse {
    pub id: i32,
    pub scenario_id: i32,
    pub status_set_id: i32,
}

impl From<test_case::Model> for TestCaseResponse {
    fn from(m: test_case::Model) -> Self {
        Self {
            id: m.id,
            scenario_id: m.scenario_id,
            status_set_id: m.status_set_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TestCaseVersionResponse {
    pub id: i32,
    pub test_case_id: i32,
    pub version: i32,
    pub release_ready: bool,
    pub name: Option<String>,
    pub description: Option<String>,
    pub steps: Option<String>,
    pub expected_result: Option<String>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
}

impl From<test_case_version::Model> for TestCaseVersionResponse {
    fn from(m: test_case_version::Model) -> Self {
        Self {
            id: m.id,
            test_case_id: m.test_case_id,
            version: m.version,
            release_ready: m.release_ready,
            name: m.name,
            description: m.description,
            steps: m.steps,
            expected_result: m.expected_result,
            created_by: m.created_by,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTestCaseBody {
    pub scenario_id: i32,
    pub status_set_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTestCaseBody {
    pub scenario_id: Option<i32>,
    pub status_set_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryTestCasesQuery {
    pub scenario_id: Option<i32>,
    pub status_set_id: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Version content fields; the version number is always server-assigned.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VersionBody {
    pub release_ready: Option<bool>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub steps: Option<String>,
    pub expected_result: Option<String>,
}

impl From<VersionBody> for VersionFields {
    fn from(b: VersionBody) -> Self {
        Self {
            release_ready: b.release_ready,
            name: b.name,
            description: b.description,
            steps: b.steps,
            expected_result: b.expected_result,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVersionBody {
    pub test_case_id: i32,
    #[serde(flatten)]
    pub fields: VersionBody,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryVersionsQuery {
    pub test_case_id: Option<i32>,
    pub created_by: Option<i32>,
    pub release_ready: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---- test cases ----

/// List test cases.
#[utoipa::path(
    get,
    path = "/api/v1/test-cases",
    tag = "Test Cases",
    responses((status = 200, description = "List of test cases"))
)]
pub async fn list_test_cases(
    pool: web::Data<DbPool>,
    query: web::Query<QueryTestCasesQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let (rows, total) = pool
        .list_test_cases(
            query.scenario_id,
            query.status_set_id,
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(TestCaseResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get a test case by id.
#[utoipa::path(
    get,
    path = "/api/v1/test-cases/{id}",
    tag = "Test Cases",
    responses(
        (status = 200, description = "The test case", body = TestCaseResponse),
        (status = 404, description = "Test case not found")
    )
)]
pub async fn get_test_case(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let found = pool
        .get_test_case(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))?;

    Ok(HttpResponse::Ok().json(TestCaseResponse::from(found)))
}

/// Create a test case.
#[utoipa::path(
    post,
    path = "/api/v1/test-cases",
    tag = "Test Cases",
    request_body = CreateTestCaseBody,
    responses((status = 201, description = "Test case created", body = TestCaseResponse))
)]
pub async fn create_test_case(
    pool: web::Data<DbPool>,
    body: web::Json<CreateTestCaseBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let created = pool
        .insert_test_case(body.scenario_id, body.status_set_id)
        .await?;
    Ok(HttpResponse::Created().json(TestCaseResponse::from(created)))
}

/// Update a test case.
#[utoipa::path(
    patch,
    path = "/api/v1/test-cases/{id}",
    tag = "Test Cases",
    request_body = UpdateTestCaseBody,
    responses(
        (status = 200, description = "Test case updated", body = TestCaseResponse),
        (status = 404, description = "Test case not found")
    )
)]
pub async fn update_test_case(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateTestCaseBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let updated = pool
        .update_test_case(path.into_inner(), body.scenario_id, body.status_set_id)
        .await?;
    Ok(HttpResponse::Ok().json(TestCaseResponse::from(updated)))
}

/// Versions of a test case, newest number first.
#[utoipa::path(
    get,
    path = "/api/v1/test-cases/{id}/versions",
    tag = "Test Cases",
    responses(
        (status = 200, description = "Versions of the test case"),
        (status = 404, description = "Test case not found")
    )
)]
pub async fn get_case_versions(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if pool.get_test_case(id).await?.is_none() {
        return Err(AppError::NotFound(format!("Test case {}", id)));
    }

    let params = QueryVersionsParams {
        test_case_id: Some(id),
        limit: 100,
        ..Default::default()
    };
    let (rows, total) = pool.list_versions(&params).await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(TestCaseVersionResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Derive a new version from the latest one, with optional overrides.
#[utoipa::path(
    post,
    path = "/api/v1/test-cases/{id}/versions/from-latest",
    tag = "Test Cases",
    request_body = VersionBody,
    responses(
        (status = 201, description = "Version created", body = TestCaseVersionResponse),
        (status = 400, description = "Test case has no versions to derive from")
    )
)]
pub async fn create_version_from_latest(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<VersionBody>,
    caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let created = pool
        .insert_version_from_latest(path.into_inner(), caller.tester_id, body.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(TestCaseVersionResponse::from(created)))
}

// ---- versions ----

/// List test case versions.
#[utoipa::path(
    get,
    path = "/api/v1/test-case-versions",
    tag = "Test Cases",
    responses((status = 200, description = "List of test case versions"))
)]
pub async fn list_versions(
    pool: web::Data<DbPool>,
    query: web::Query<QueryVersionsQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let params = QueryVersionsParams {
        test_case_id: query.test_case_id,
        created_by: query.created_by,
        release_ready: query.release_ready,
        limit: query.limit.unwrap_or(20),
        offset: query.offset.unwrap_or(0),
    };
    let (rows, total) = pool.list_versions(&params).await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(TestCaseVersionResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get a version by id.
#[utoipa::path(
    get,
    path = "/api/v1/test-case-versions/{id}",
    tag = "Test Cases",
    responses(
        (status = 200, description = "The version", body = TestCaseVersionResponse),
        (status = 404, description = "Version not found")
    )
)]
pub async fn get_version(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let found = pool
        .get_version(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test case version {}", id)))?;

    Ok(HttpResponse::Ok().json(TestCaseVersionResponse::from(found)))
}

/// Create a version; the number is assigned server-side.
#[utoipa::path(
    post,
    path = "/api/v1/test-case-versions",
    tag = "Test Cases",
    request_body = CreateVersionBody,
    responses(
        (status = 201, description = "Version created", body = TestCaseVersionResponse),
        (status = 400, description = "Invalid test case reference")
    )
)]
pub async fn create_version(
    pool: web::Data<DbPool>,
    body: web::Json<CreateVersionBody>,
    caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let created = pool
        .insert_version(body.test_case_id, caller.tester_id, body.fields.into())
        .await?;
    Ok(HttpResponse::Created().json(TestCaseVersionResponse::from(created)))
}

/// Update a version's mutable descriptive fields.
#[utoipa::path(
    patch,
    path = "/api/v1/test-case-versions/{id}",
    tag = "Test Cases",
    request_body = VersionBody,
    responses(
        (status = 200, description = "Version updated", body = TestCaseVersionResponse),
        (status = 404, description = "Version not found")
    )
)]
pub async fn update_version(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<VersionBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let updated = pool
        .update_version(path.into_inner(), body.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(TestCaseVersionResponse::from(updated)))
}

/// Configure test case routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/test-cases")
            .route(web::get().to(list_test_cases))
            .route(web::post().to(create_test_case)),
    )
    .service(
        web::resource("/test-cases/{id}")
            .route(web::get().to(get_test_case))
            .route(web::patch().to(update_test_case)),
    )
    .service(web::resource("/test-cases/{id}/versions").route(web::get().to(get_case_versions)))
    .service(
        web::resource("/test-cases/{id}/versions/from-latest")
            .route(web::post().to(create_version_from_latest)),
    )
    .service(
        web::resource("/test-case-versions")
            .route(web::get().to(list_versions))
            .route(web::post().to(create_version)),
    )
    .service(
        web::resource("/test-case-versions/{id}")
            .route(web::get().to(get_version))
            .route(web::patch().to(update_version)),
    );
}
