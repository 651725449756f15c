//! Shared fixtures for unit tests.

use crate::config::Config;
use crate::database::{self, models::User};
use chrono::Utc;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use tempfile::TempDir;
use uuid::Uuid;

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
        acquire_timeout_seconds: 3,
        jwt_secret: "test-secret".to_string(),
        access_token_ttl_seconds: 15 * 60,
        refresh_token_ttl_seconds: 7 * 24 * 60 * 60,
        server_port: 0,
        production: false,
    }
}

/// In-memory database with migrations applied. A single connection that is
/// never recycled, since each in-memory connection is its own database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    database::migrate(&pool).await.unwrap();
    pool
}

/// File-backed database shared by several pooled connections, removed when
/// dropped.
pub struct TempDatabase {
    pool: SqlitePool,
    _dir: TempDir,
}

impl TempDatabase {
    pub async fn new(max_connections: u32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("auth.db").display());
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&url)
            .await
            .unwrap();
        database::migrate(&pool).await.unwrap();
        TempDatabase { pool, _dir: dir }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

pub async fn seed_user(pool: &SqlitePool, email: &str, password: &str) -> User {
    let now = Utc::now();
    let password_hash = bcrypt::hash(password, 4).unwrap();

    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, name, email, password_hash, created_at, updated_at
        "#,
    )
    .bind(Uuid::now_v7().to_string())
    .bind(email.split('@').next().unwrap_or(email))
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .unwrap()
}
