//! Defines the HTTP routes specifically for authentication.
//!
//! These are designed to be nested into the main Axum router under `/auth`.

use crate::auth::handlers::*;
use crate::auth::middleware::*;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", post(login))
        .route("/refresh", get(refresh_token))
        .route("/logout", post(logout))
        .route("/claims", get(claims).layer(middleware::from_fn(jwt_auth)))
}
