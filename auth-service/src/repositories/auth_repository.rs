//! Database repository for the authentication lifecycle.
//!
//! Defines the store contract the session layer depends on and its SQLite
//! implementation. The store only persists; deciding when a refresh token is
//! revoked belongs to [`crate::auth::service::AuthService`].

use crate::database::models::{CreateRefreshToken, RefreshToken, User};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Persistence operations required by the authentication service.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// The user's refresh token that is neither revoked nor expired.
    async fn find_active_token_by_user_id(&self, user_id: &str) -> Result<Option<RefreshToken>>;

    /// Revokes the user's active refresh token and stores `token` in its
    /// place, atomically. On failure nothing is changed.
    async fn rotate_refresh_token(&self, token: CreateRefreshToken) -> Result<RefreshToken>;

    /// Revokes every refresh token of the user. Returns the rows changed.
    async fn revoke_all_tokens_by_user_id(&self, user_id: &str) -> Result<u64>;
}

/// SQLite-backed [`AuthRepository`].
#[derive(Clone)]
pub struct SqliteAuthRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl SqliteAuthRepository {
    /// Creates a new SqliteAuthRepository instance.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

const TOKEN_COLUMNS: &str = "id, user_id, token_hash, expires_at, revoked, created_at, updated_at";

#[async_trait]
impl AuthRepository for SqliteAuthRepository {
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_active_token_by_user_id(&self, user_id: &str) -> Result<Option<RefreshToken>> {
        let token = sqlx::query_as::<_, RefreshToken>(&format!(
            r#"
            SELECT {TOKEN_COLUMNS} FROM refresh_tokens
            WHERE user_id = ? AND revoked = 0 AND julianday(expires_at) > julianday(?)
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    async fn rotate_refresh_token(&self, token: CreateRefreshToken) -> Result<RefreshToken> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Writing first takes SQLite's write lock before anything is read,
        // so concurrent rotations for one user run one after the other.
        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = 1, updated_at = ?
            WHERE user_id = ? AND revoked = 0 AND julianday(expires_at) > julianday(?)
            "#,
        )
        .bind(now)
        .bind(&token.user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let created = sqlx::query_as::<_, RefreshToken>(&format!(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, revoked, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            RETURNING {TOKEN_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7().to_string())
        .bind(&token.user_id)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn revoke_all_tokens_by_user_id(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = 1, updated_at = ?
            WHERE user_id = ? AND revoked = 0
            "#,
        )
        .bind(Utc::now())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
