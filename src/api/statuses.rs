//! CRUD handlers for status sets and statuses.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthenticatedTester;
use crate::db::DbPool;
use crate::entity::{status, status_set};
use crate::error::{AppError, AppResult};
use crate::models::StatusRole;

use super::catalog::{ListResponse, PageQuery};

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusSetResponse {
    pub id: i32,
    pub name: String,
}

impl From<status_set::Model> for StatusSetResponse {
    fn from(m: status_set::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub id: i32,
    pub status_set_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub role: StatusRole,
}

impl From<status::Model> for StatusResponse {
    fn from(m: status::Model) -> Self {
        Self {
            id: m.id,
            status_set_id: m.status_set_id,
            name: m.name,
            description: m.description,
            role: StatusRole::parse(&m.role),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusSetBody {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStatusBody {
    pub status_set_id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `other` when omitted.
    pub role: Option<StatusRole>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub role: Option<StatusRole>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryStatusesQuery {
    pub status_set_id: Option<i32>,
    pub role: Option<StatusRole>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List status sets.
#[utoipa::path(
    get,
    path = "/api/v1/status-sets",
    tag = "Statuses",
    responses((status = 200, description = "List of status sets"))
)]
pub async fn list_status_sets(
    pool: web::Data<DbPool>,
    query: web::Query<PageQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let (rows, total) = pool
        .list_status_sets(query.limit.unwrap_or(20), query.offset.unwrap_or(0))
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(StatusSetResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get a status set by id.
#[utoipa::path(
    get,
    path = "/api/v1/status-sets/{id}",
    tag = "Statuses",
    responses(
        (status = 200, description = "The status set", body = StatusSetResponse),
        (status = 404, description = "Status set not found")
    )
)]
pub async fn get_status_set(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let set = pool
        .get_status_set(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Status set {}", id)))?;

    Ok(HttpResponse::Ok().json(StatusSetResponse::from(set)))
}

/// Create a status set.
#[utoipa::path(
    post,
    path = "/api/v1/status-sets",
    tag = "Statuses",
    request_body = StatusSetBody,
    responses((status = 201, description = "Status set created", body = StatusSetResponse))
)]
pub async fn create_status_set(
    pool: web::Data<DbPool>,
    body: web::Json<StatusSetBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let created = pool.insert_status_set(body.into_inner().name).await?;
    Ok(HttpResponse::Created().json(StatusSetResponse::from(created)))
}

/// Update a status set.
#[utoipa::path(
    patch,
    path = "/api/v1/status-sets/{id}",
    tag = "Statuses",
    request_body = StatusSetBody,
    responses(
        (status = 200, description = "Status set updated", body = StatusSetResponse),
        (status = 404, description = "Status set not found")
    )
)]
pub async fn update_status_set(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<StatusSetBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let updated = pool
        .update_status_set(path.into_inner(), body.into_inner().name)
        .await?;
    Ok(HttpResponse::Ok().json(StatusSetResponse::from(updated)))
}

/// List statuses.
#[utoipa::path(
    get,
    path = "/api/v1/statuses",
    tag = "Statuses",
    responses((status = 200, description = "List of statuses"))
)]
pub async fn list_statuses(
    pool: web::Data<DbPool>,
    query: web::Query<QueryStatusesQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let (rows, total) = pool
        .list_statuses(
            query.status_set_id,
            query.role,
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(StatusResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get a status by id.
#[utoipa::path(
    get,
    path = "/api/v1/statuses/{id}",
    tag = "Statuses",
    responses(
        (status = 200, description = "The status", body = StatusResponse),
        (status = 404, description = "Status not found")
    )
)]
pub async fn get_status(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let status = pool
        .get_status(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Status {}", id)))?;

    Ok(HttpResponse::Ok().json(StatusResponse::from(status)))
}

/// Create a status.
#[utoipa::path(
    post,
    path = "/api/v1/statuses",
    tag = "Statuses",
    request_body = CreateStatusBody,
    responses(
        (status = 201, description = "Status created", body = StatusResponse),
        (status = 409, description = "Status name already used in this set")
    )
)]
pub async fn create_status(
    pool: web::Data<DbPool>,
    body: web::Json<CreateStatusBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let created = pool
        .insert_status(
            body.status_set_id,
            body.name,
            body.description,
            body.role.unwrap_or(StatusRole::Other),
        )
        .await?;
    Ok(HttpResponse::Created().json(StatusResponse::from(created)))
}

/// Update a status.
#[utoipa::path(
    patch,
    path = "/api/v1/statuses/{id}",
    tag = "Statuses",
    request_body = UpdateStatusBody,
    responses(
        (status = 200, description = "Status updated", body = StatusResponse),
        (status = 404, description = "Status not found")
    )
)]
pub async fn update_status(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateStatusBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let updated = pool
        .update_status(path.into_inner(), body.name, body.description, body.role)
        .await?;
    Ok(HttpResponse::Ok().json(StatusResponse::from(updated)))
}

/// Configure status routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/status-sets")
            .route(web::get().to(list_status_sets))
            .route(web::post().to(create_status_set)),
    )
    .service(
        web::resource("/status-sets/{id}")
            .route(web::get().to(get_status_set))
            .route(web::patch().to(update_status_set)),
    )
    .service(
        web::resource("/statuses")
            .route(web::get().to(list_statuses))
            .route(web::post().to(create_status)),
    )
    .service(
        web::resource("/statuses/{id}")
            .route(web::get().to(get_status))
            .route(web::patch().to(update_status)),
    );
}
