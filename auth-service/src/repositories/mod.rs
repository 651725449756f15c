//! Persistence layer.

pub mod auth_repository;
