//! Authentication module: login, refresh-token renewal and revocation.
//!
//! This module provides the session service together with the HTTP handlers,
//! cookie helpers and bearer-token middleware that expose it.

pub mod cookie;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
