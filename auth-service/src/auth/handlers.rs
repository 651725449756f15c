//! Handler functions for authentication-related API endpoints.
//!
//! These functions extract request data (JSON bodies, the refresh token
//! cookie, bearer claims), call into `auth::service`, and translate the
//! outcome into HTTP responses and cookies.

use crate::api::common::{ApiError, ApiResponse, service_error_to_http};
use crate::auth::cookie::{
    REFRESH_COOKIE_NAME, clear_refresh_cookie, get_cookie, refresh_cookie,
};
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::errors::ServiceError;
use crate::utils::jwt::{Claims, TokenType};
use axum::{
    extract::{Extension, Json, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Json as ResponseJson},
};
use std::sync::Arc;
use tracing::warn;

/// Cookie attributes for the refresh token, fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub secure: bool,
    pub max_age_seconds: u64,
}

fn refresh_cookie_from(headers: &HeaderMap) -> Result<&str, ApiError> {
    get_cookie(headers, REFRESH_COOKIE_NAME).ok_or_else(|| {
        service_error_to_http(ServiceError::unauthorized(
            "Invalid refresh_token cookie",
        ))
    })
}

/// Liveness endpoint
pub async fn index() -> ResponseJson<ApiResponse<serde_json::Value>> {
    ResponseJson(ApiResponse::success(
        serde_json::json!({ "service": "auth-service" }),
        "This is the auth service",
    ))
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(auth_service): Extension<Arc<AuthService>>,
    Extension(policy): Extension<CookiePolicy>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(%rejection, "Rejected login payload");
        service_error_to_http(ServiceError::validation("Invalid request payload"))
    })?;

    let response = auth_service
        .login(payload)
        .await
        .map_err(service_error_to_http)?;

    let cookie = refresh_cookie(&response.refresh_token, policy.max_age_seconds, policy.secure)
        .ok_or_else(|| {
            service_error_to_http(ServiceError::internal_error(
                "Refresh token is not a valid cookie value",
            ))
        })?;

    Ok((
        [(SET_COOKIE, cookie)],
        ResponseJson(AccessTokenResponse::from(response)),
    ))
}

/// Handle token refresh request
#[axum::debug_handler]
pub async fn refresh_token(
    Extension(auth_service): Extension<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<ResponseJson<AccessTokenResponse>, ApiError> {
    let refresh = refresh_cookie_from(&headers)?;

    auth_service
        .refresh_token(refresh)
        .await
        .map(ResponseJson)
        .map_err(service_error_to_http)
}

/// Handle logout request: revoke the user's refresh tokens and clear the cookie
#[axum::debug_handler]
pub async fn logout(
    Extension(auth_service): Extension<Arc<AuthService>>,
    Extension(policy): Extension<CookiePolicy>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh = refresh_cookie_from(&headers)?;

    let claims = auth_service
        .parse_claims(refresh, TokenType::Refresh)
        .map_err(service_error_to_http)?;

    auth_service
        .logout(claims.user_id())
        .await
        .map_err(service_error_to_http)?;

    Ok((
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, clear_refresh_cookie(policy.secure))],
    ))
}

/// Echo the claims of the presented access token
#[axum::debug_handler]
pub async fn claims(Extension(claims): Extension<Claims>) -> ResponseJson<Claims> {
    ResponseJson(claims)
}
