//! Handlers for testers, tester types, and tester groups.
//!
//! Creating testers with an explicit type and managing types/groups is
//! admin-tier only; listing and profile reads are open to any caller.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{self, AuthenticatedTester};
use crate::db::testers::{NewTester, QueryTestersParams, TesterUpdate};
use crate::db::DbPool;
use crate::entity::{tester, tester_group, tester_type};
use crate::error::{AppError, AppResult};

use super::catalog::{ListResponse, PageQuery};

#[derive(Debug, Serialize, ToSchema)]
pub struct TesterResponse {
    pub id: i32,
    pub tester_type_id: i32,
    pub tester_group_id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<tester::Model> for TesterResponse {
    fn from(m: tester::Model) -> Self {
        Self {
            id: m.id,
            tester_type_id: m.tester_type_id,
            tester_group_id: m.tester_group_id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            active: m.active,
            created_at: m.created_at,
            last_login_at: m.last_login_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TesterTypeResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<tester_type::Model> for TesterTypeResponse {
    fn from(m: tester_type::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TesterGroupResponse {
    pub id: i32,
    pub name: String,
    pub created_by_id: i32,
    pub owner_id: i32,
}

impl From<tester_group::Model> for TesterGroupResponse {
    fn from(m: tester_group::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            created_by_id: m.created_by_id,
            owner_id: m.owner_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryTestersQuery {
    pub tester_type_id: Option<i32>,
    pub tester_group_id: Option<i32>,
    pub active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTesterBody {
    pub tester_type_id: i32,
    pub tester_group_id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTesterBody {
    pub tester_type_id: Option<i32>,
    pub tester_group_id: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TesterTypeBody {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTesterTypeBody {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTesterGroupBody {
    pub name: String,
    pub owner_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTesterGroupBody {
    pub name: Option<String>,
    pub owner_id: Option<i32>,
}

// ---- testers ----

/// List testers.
#[utoipa::path(
    get,
    path = "/api/v1/testers",
    tag = "Testers",
    responses((status = 200, description = "List of testers"))
)]
pub async fn list_testers(
    pool: web::Data<DbPool>,
    query: web::Query<QueryTestersQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let params = QueryTestersParams {
        tester_type_id: query.tester_type_id,
        tester_group_id: query.tester_group_id,
        active: query.active,
        limit: query.limit.unwrap_or(20),
        offset: query.offset.unwrap_or(0),
    };
    let (rows, total) = pool.list_testers(&params).await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(TesterResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get a tester by id.
#[utoipa::path(
    get,
    path = "/api/v1/testers/{id}",
    tag = "Testers",
    responses(
        (status = 200, description = "The tester", body = TesterResponse),
        (status = 404, description = "Tester not found")
    )
)]
pub async fn get_tester(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let found = pool
        .get_tester(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tester {}", id)))?;

    Ok(HttpResponse::Ok().json(TesterResponse::from(found)))
}

/// Create a tester with an explicit tester type. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/testers",
    tag = "Testers",
    request_body = CreateTesterBody,
    responses(
        (status = 201, description = "Tester created", body = TesterResponse),
        (status = 403, description = "Admin tester type required"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_tester(
    pool: web::Data<DbPool>,
    body: web::Json<CreateTesterBody>,
    caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    auth::require_admin(&pool, &caller).await?;

    let body = body.into_inner();
    let created = pool
        .insert_tester(NewTester {
            tester_type_id: body.tester_type_id,
            tester_group_id: body.tester_group_id,
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            password_hash: auth::hash_password(&body.password)?,
        })
        .await?;

    Ok(HttpResponse::Created().json(TesterResponse::from(created)))
}

/// Update a tester. Admin only, except for a tester editing their own name.
#[utoipa::path(
    patch,
    path = "/api/v1/testers/{id}",
    tag = "Testers",
    request_body = UpdateTesterBody,
    responses(
        (status = 200, description = "Tester updated", body = TesterResponse),
        (status = 403, description = "Admin tester type required"),
        (status = 404, description = "Tester not found")
    )
)]
pub async fn update_tester(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateTesterBody>,
    caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let body = body.into_inner();

    let touches_admin_fields =
        body.tester_type_id.is_some() || body.tester_group_id.is_some() || body.active.is_some();
    if id != caller.tester_id || touches_admin_fields {
        auth::require_admin(&pool, &caller).await?;
    }

    let updated = pool
        .update_tester(
            id,
            TesterUpdate {
                tester_type_id: body.tester_type_id,
                tester_group_id: body.tester_group_id,
                first_name: body.first_name,
                last_name: body.last_name,
                active: body.active,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(TesterResponse::from(updated)))
}

// ---- tester types ----

/// List tester types.
#[utoipa::path(
    get,
    path = "/api/v1/tester-types",
    tag = "Testers",
    responses((status = 200, description = "List of tester types"))
)]
pub async fn list_tester_types(
    pool: web::Data<DbPool>,
    query: web::Query<PageQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let (rows, total) = pool
        .list_tester_types(query.limit.unwrap_or(20), query.offset.unwrap_or(0))
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(TesterTypeResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get a tester type by id.
#[utoipa::path(
    get,
    path = "/api/v1/tester-types/{id}",
    tag = "Testers",
    responses(
        (status = 200, description = "The tester type", body = TesterTypeResponse),
        (status = 404, description = "Tester type not found")
    )
)]
pub async fn get_tester_type(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let found = pool
        .get_tester_type(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tester type {}", id)))?;

    Ok(HttpResponse::Ok().json(TesterTypeResponse::from(found)))
}

/// Create a tester type. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/tester-types",
    tag = "Testers",
    request_body = TesterTypeBody,
    responses(
        (status = 201, description = "Tester type created", body = TesterTypeResponse),
        (status = 403, description = "Admin tester type required")
    )
)]
pub async fn create_tester_type(
    pool: web::Data<DbPool>,
    body: web::Json<TesterTypeBody>,
    caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    auth::require_admin(&pool, &caller).await?;

    let body = body.into_inner();
    let created = pool.insert_tester_type(body.name, body.description).await?;
    Ok(HttpResponse::Created().json(TesterTypeResponse::from(created)))
}

/// Update a tester type. Admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/tester-types/{id}",
    tag = "Testers",
    request_body = UpdateTesterTypeBody,
    responses(
        (status = 200, description = "Tester type updated", body = TesterTypeResponse),
        (status = 403, description = "Admin tester type required"),
        (status = 404, description = "Tester type not found")
    )
)]
pub async fn update_tester_type(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateTesterTypeBody>,
    caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    auth::require_admin(&pool, &caller).await?;

    let body = body.into_inner();
    let updated = pool
        .update_tester_type(path.into_inner(), body.name, body.description)
        .await?;
    Ok(HttpResponse::Ok().json(TesterTypeResponse::from(updated)))
}

// ---- tester groups ----

/// List tester groups.
#[utoipa::path(
    get,
    path = "/api/v1/tester-groups",
    tag = "Testers",
    responses((status = 200, description = "List of tester groups"))
)]
pub async fn list_tester_groups(
    pool: web::Data<DbPool>,
    query: web::Query<PageQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let (rows, total) = pool
        .list_tester_groups(query.limit.unwrap_or(20), query.offset.unwrap_or(0))
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(TesterGroupResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get a tester group by id.
#[utoipa::path(
    get,
    path = "/api/v1/tester-groups/{id}",
    tag = "Testers",
    responses(
        (status = 200, description = "The tester group", body = TesterGroupResponse),
        (status = 404, description = "Tester group not found")
    )
)]
pub async fn get_tester_group(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let found = pool
        .get_tester_group(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tester group {}", id)))?;

    Ok(HttpResponse::Ok().json(TesterGroupResponse::from(found)))
}

/// Create a tester group owned by the caller unless another owner is named.
#[utoipa::path(
    post,
    path = "/api/v1/tester-groups",
    tag = "Testers",
    request_body = CreateTesterGroupBody,
    responses(
        (status = 201, description = "Tester group created", body = TesterGroupResponse),
        (status = 409, description = "Group name already used")
    )
)]
pub async fn create_tester_group(
    pool: web::Data<DbPool>,
    body: web::Json<CreateTesterGroupBody>,
    caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let owner_id = body.owner_id.unwrap_or(caller.tester_id);
    let created = pool
        .insert_tester_group(body.name, caller.tester_id, owner_id)
        .await?;
    Ok(HttpResponse::Created().json(TesterGroupResponse::from(created)))
}

/// Update a tester group. Admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/tester-groups/{id}",
    tag = "Testers",
    request_body = UpdateTesterGroupBody,
    responses(
        (status = 200, description = "Tester group updated", body = TesterGroupResponse),
        (status = 403, description = "Admin tester type required"),
        (status = 404, description = "Tester group not found")
    )
)]
pub async fn update_tester_group(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateTesterGroupBody>,
    caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    auth::require_admin(&pool, &caller).await?;

    let body = body.into_inner();
    let updated = pool
        .update_tester_group(path.into_inner(), body.name, body.owner_id)
        .await?;
    Ok(HttpResponse::Ok().json(TesterGroupResponse::from(updated)))
}

/// Configure tester routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/testers")
            .route(web::get().to(list_testers))
            .route(web::post().to(create_tester)),
    )
    .service(
        web::resource("/testers/{id}")
            .route(web::get().to(get_tester))
            .route(web::patch().to(update_tester)),
    )
    .service(
        web::resource("/tester-types")
            .route(web::get().to(list_tester_types))
            .route(web::post().to(create_tester_type)),
    )
    .service(
        web::resource("/tester-types/{id}")
            .route(web::get().to(get_tester_type))
            .route(web::patch().to(update_tester_type)),
    )
    .service(
        web::resource("/tester-groups")
            .route(web::get().to(list_tester_groups))
            .route(web::post().to(create_tester_group)),
    )
    .service(
        web::resource("/tester-groups/{id}")
            .route(web::get().to(get_tester_group))
            .route(web::patch().to(update_tester_group)),
    );
}
