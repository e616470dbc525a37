//! Actix-web extractor for bearer-token authentication.

use actix_web::dev::Payload;
use actix_web::http::{header, StatusCode};
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use std::future::{ready, Ready};

use crate::config::Config;
use crate::error::ErrorResponse;

use super::{verify_token, SessionClaims};

/// Authentication error for extractors.
#[derive(Debug)]
pub struct AuthError {
    message: String,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::UNAUTHORIZED).json(ErrorResponse {
            error: "UNAUTHORIZED".to_string(),
            message: self.message.clone(),
        })
    }
}

/// Extractor that requires a valid session token.
///
/// Use this in handlers that require authentication:
/// ```ignore
/// async fn protected_handler(auth: AuthenticatedTester) -> impl Responder {
///     // auth.tester_id identifies the caller
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedTester {
    pub tester_id: i32,
    pub email: String,
    pub tester_type_id: i32,
}

impl AuthenticatedTester {
    fn from_claims(claims: SessionClaims) -> Result<Self, AuthError> {
        let tester_id = claims.sub.parse::<i32>().map_err(|_| AuthError {
            message: "Malformed session token subject".to_string(),
        })?;

        Ok(Self {
            tester_id,
            email: claims.email,
            tester_type_id: claims.tester_type_id,
        })
    }
}

impl FromRequest for AuthenticatedTester {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(config) = req.app_data::<web::Data<Config>>() else {
            return ready(Err(AuthError {
                message: "Internal configuration error".to_string(),
            }));
        };

        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        match token {
            Some(token) => match verify_token(config, token) {
                Ok(claims) => ready(AuthenticatedTester::from_claims(claims)),
                Err(e) => ready(Err(AuthError {
                    message: e.to_string(),
                })),
            },
            None => ready(Err(AuthError {
                message: "Missing bearer token. Provide an Authorization header.".to_string(),
            })),
        }
    }
}
