//! Handlers for test suites and suite membership.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthenticatedTester;
use crate::db::DbPool;
use crate::entity::{suitcase, test_suite};
use crate::error::{AppError, AppResult};

use super::catalog::{ListResponse, PageQuery};
use super::test_cases::TestCaseVersionResponse;

#[derive(Debug, Serialize, ToSchema)]
pub struct TestSuiteResponse {
    pub id: i32,
    pub name: String,
}

impl From<test_suite::Model> for TestSuiteResponse {
    fn from(m: test_suite::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuitcaseResponse {
    pub id: i32,
    pub test_case_id: i32,
    pub test_suite_id: i32,
}

impl From<suitcase::Model> for SuitcaseResponse {
    fn from(m: suitcase::Model) -> Self {
        Self {
            id: m.id,
            test_case_id: m.test_case_id,
            test_suite_id: m.test_suite_id,
        }
    }
}

/// A suite member with its latest version, when one exists.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuiteMemberResponse {
    pub test_case_id: i32,
    pub scenario_id: i32,
    pub latest_version: Option<TestCaseVersionResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TestSuiteBody {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSuitcaseBody {
    pub test_case_id: i32,
    pub test_suite_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuerySuitcasesQuery {
    pub test_case_id: Option<i32>,
    pub test_suite_id: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---- test suites ----

/// List test suites.
#[utoipa::path(
    get,
    path = "/api/v1/test-suites",
    tag = "Test Suites",
    responses((status = 200, description = "List of test suites"))
)]
pub async fn list_test_suites(
    pool: web::Data<DbPool>,
    query: web::Query<PageQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let (rows, total) = pool
        .list_test_suites(query.limit.unwrap_or(20), query.offset.unwrap_or(0))
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(TestSuiteResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get a test suite by id.
#[utoipa::path(
    get,
    path = "/api/v1/test-suites/{id}",
    tag = "Test Suites",
    responses(
        (status = 200, description = "The test suite", body = TestSuiteResponse),
        (status = 404, description = "Test suite not found")
    )
)]
pub async fn get_test_suite(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let found = pool
        .get_test_suite(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test suite {}", id)))?;

    Ok(HttpResponse::Ok().json(TestSuiteResponse::from(found)))
}

/// Create a test suite.
#[utoipa::path(
    post,
    path = "/api/v1/test-suites",
    tag = "Test Suites",
    request_body = TestSuiteBody,
    responses(
        (status = 201, description = "Test suite created", body = TestSuiteResponse),
        (status = 409, description = "Suite name already used")
    )
)]
pub async fn create_test_suite(
    pool: web::Data<DbPool>,
    body: web::Json<TestSuiteBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let created = pool.insert_test_suite(body.into_inner().name).await?;
    Ok(HttpResponse::Created().json(TestSuiteResponse::from(created)))
}

/// Update a test suite.
#[utoipa::path(
    patch,
    path = "/api/v1/test-suites/{id}",
    tag = "Test Suites",
    request_body = TestSuiteBody,
    responses(
        (status = 200, description = "Test suite updated", body = TestSuiteResponse),
        (status = 404, description = "Test suite not found")
    )
)]
pub async fn update_test_suite(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<TestSuiteBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let updated = pool
        .update_test_suite(path.into_inner(), body.into_inner().name)
        .await?;
    Ok(HttpResponse::Ok().json(TestSuiteResponse::from(updated)))
}

/// Member test cases of a suite, each with its latest version.
#[utoipa::path(
    get,
    path = "/api/v1/test-suites/{id}/test-cases",
    tag = "Test Suites",
    responses(
        (status = 200, description = "Suite members with latest versions"),
        (status = 404, description = "Test suite not found")
    )
)]
pub async fn get_suite_members(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let members = pool
        .suite_members_with_latest_version(path.into_inner())
        .await?;

    let items: Vec<SuiteMemberResponse> = members
        .into_iter()
        .map(|(case, latest)| SuiteMemberResponse {
            test_case_id: case.id,
            scenario_id: case.scenario_id,
            latest_version: latest.map(TestCaseVersionResponse::from),
        })
        .collect();

    let total = items.len() as i64;
    Ok(HttpResponse::Ok().json(ListResponse { items, total }))
}

// ---- suitcases ----

/// List suite memberships.
#[utoipa::path(
    get,
    path = "/api/v1/suitcases",
    tag = "Test Suites",
    responses((status = 200, description = "List of memberships"))
)]
pub async fn list_suitcases(
    pool: web::Data<DbPool>,
    query: web::Query<QuerySuitcasesQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let (rows, total) = pool
        .list_suitcases(
            query.test_case_id,
            query.test_suite_id,
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(SuitcaseResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Add a test case to a suite.
#[utoipa::path(
    post,
    path = "/api/v1/suitcases",
    tag = "Test Suites",
    request_body = CreateSuitcaseBody,
    responses(
        (status = 201, description = "Membership created", body = SuitcaseResponse),
        (status = 409, description = "Test case already in suite")
    )
)]
pub async fn create_suitcase(
    pool: web::Data<DbPool>,
    body: web::Json<CreateSuitcaseBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let created = pool
        .insert_suitcase(body.test_case_id, body.test_suite_id)
        .await?;
    Ok(HttpResponse::Created().json(SuitcaseResponse::from(created)))
}

/// Remove a test case from a suite.
#[utoipa::path(
    delete,
    path = "/api/v1/suitcases/{id}",
    tag = "Test Suites",
    responses(
        (status = 204, description = "Membership removed"),
        (status = 404, description = "Membership not found")
    )
)]
pub async fn delete_suitcase(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    pool.delete_suitcase(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configure test suite routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/test-suites")
            .route(web::get().to(list_test_suites))
            .route(web::post().to(create_test_suite)),
    )
    .service(
        web::resource("/test-suites/{id}")
            .route(web::get().to(get_test_suite))
            .route(web::patch().to(update_test_suite)),
    )
    .service(web::resource("/test-suites/{id}/test-cases").route(web::get().to(get_suite_members)))
    .service(
        web::resource("/suitcases")
            .route(web::get().to(list_suitcases))
            .route(web::post().to(create_suitcase)),
    )
    .service(web::resource("/suitcases/{id}").route(web::delete().to(delete_suitcase)));
}
