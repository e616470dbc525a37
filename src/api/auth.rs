//! Authentication endpoints: register, login, and caller identity.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{self, AuthenticatedTester};
use crate::config::Config;
use crate::db::testers::NewTester;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};

/// Registration request. New testers land in the standard tier; admins
/// promote them afterwards.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued bearer token.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// Caller identity derived from the bearer token.
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub tester_id: i32,
    pub email: String,
    pub tester_type_id: i32,
}

const MIN_PASSWORD_LEN: usize = 8;

/// Register a new tester account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Tester registered", body = TokenResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    if body.first_name.trim().is_empty() || body.last_name.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "first_name and last_name are required".to_string(),
        ));
    }
    if !body.email.contains('@') {
        return Err(AppError::InvalidInput("Invalid email address".to_string()));
    }
    if body.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let default_type = pool
        .find_default_tester_type()
        .await?
        .ok_or_else(|| AppError::Configuration("No tester types are seeded".to_string()))?;

    let tester = pool
        .insert_tester(NewTester {
            tester_type_id: default_type.id,
            tester_group_id: None,
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            password_hash: auth::hash_password(&body.password)?,
        })
        .await?;

    let (access_token, expires_in) = auth::issue_token(&config, &tester)?;

    Ok(HttpResponse::Created().json(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in,
    }))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    let tester = pool.find_tester_by_email(&body.email).await?;

    // A missing account and a wrong password answer identically.
    let Some(tester) = tester else {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };
    if !tester.active || !auth::verify_password(&body.password, &tester.password_hash) {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    pool.touch_last_login(tester.id).await?;
    let (access_token, expires_in) = auth::issue_token(&config, &tester)?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in,
    }))
}

/// Return the caller's identity.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Caller identity", body = MeResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn me(caller: AuthenticatedTester) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(MeResponse {
        tester_id: caller.tester_id,
        email: caller.email,
        tester_type_id: caller.tester_type_id,
    }))
}

/// Configure auth routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/auth/register").route(web::post().to(register)))
        .service(web::resource("/auth/login").route(web::post().to(login)))
        .service(web::resource("/auth/me").route(web::get().to(me)));
}
