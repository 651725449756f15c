//! Middleware for protecting authenticated routes.
//!
//! Validates the bearer access token and exposes the parsed [`Claims`] to
//! downstream handlers through request extensions.

use crate::api::common::{ApiError, service_error_to_http};
use crate::auth::service::AuthService;
use crate::errors::ServiceError;
use crate::utils::jwt::{Claims, TokenType};
use axum::{
    extract::Request,
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ServiceError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ServiceError::unauthorized("Authorization header is required"))?;

    match auth_header.split_once(' ') {
        Some(("Bearer", token)) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(ServiceError::unauthorized(
            "Invalid Authorization header format",
        )),
    }
}

/// JWT authentication middleware
pub async fn jwt_auth(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let service = request
        .extensions()
        .get::<Arc<AuthService>>()
        .cloned()
        .ok_or_else(|| {
            service_error_to_http(ServiceError::internal_error(
                "AuthService extension missing",
            ))
        })?;

    let claims: Claims = bearer_token(request.headers())
        .and_then(|token| service.parse_claims(token, TokenType::Access))
        .map_err(service_error_to_http)?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
