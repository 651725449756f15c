//! Core business logic for the authentication system.
//!
//! A user holds at most one active refresh token. Login revokes the previous
//! one and stores the digest of the new one in the same transaction; refresh
//! only succeeds for the token whose digest is currently stored; logout
//! revokes everything. A revoked token never becomes active again.

use crate::auth::models::{AccessTokenResponse, LoginRequest, LoginResponse};
use crate::database::models::{CreateRefreshToken, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::auth_repository::AuthRepository;
use crate::utils::jwt::{Claims, JwtUtils, TokenType, digests_match, hash_token};
use bcrypt::verify;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

/// Authentication service for handling login, token refresh and logout
pub struct AuthService {
    repo: Arc<dyn AuthRepository>,
    jwt_utils: JwtUtils,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(repo: Arc<dyn AuthRepository>, jwt_utils: JwtUtils) -> Self {
        AuthService { repo, jwt_utils }
    }

    fn access_expires_in(&self) -> u64 {
        self.jwt_utils.access_ttl().num_seconds().max(0) as u64
    }

    /// Authenticate user and issue an access/refresh token pair
    pub async fn login(&self, login_request: LoginRequest) -> ServiceResult<LoginResponse> {
        if let Err(validation_errors) = login_request.validate() {
            let error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect();
            return Err(ServiceError::validation(error_messages.join(", ")));
        }

        let user = self
            .repo
            .find_user_by_email(&login_request.email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &login_request.email))?;

        Self::verify_password(&login_request.password, &user.password_hash)?;

        let access_token = self.jwt_utils.generate_access_token(&user)?;
        let refresh_token = self.jwt_utils.generate_refresh_token(&user)?;

        self.repo
            .rotate_refresh_token(CreateRefreshToken {
                user_id: user.id.clone(),
                token_hash: hash_token(&refresh_token),
                expires_at: Utc::now() + self.jwt_utils.refresh_ttl(),
            })
            .await?;

        info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            access_token,
            refresh_token,
            expires_in: self.access_expires_in(),
        })
    }

    /// Exchange the current refresh token for a new access token
    pub async fn refresh_token(&self, refresh_token: &str) -> ServiceResult<AccessTokenResponse> {
        let claims = self.parse_claims(refresh_token, TokenType::Refresh)?;

        let user: User = self
            .repo
            .find_user_by_id(claims.user_id())
            .await?
            .ok_or_else(|| ServiceError::not_found("User", claims.user_id()))?;

        let stored = self
            .repo
            .find_active_token_by_user_id(&user.id)
            .await?
            .filter(|token| token.is_active())
            .ok_or_else(|| {
                warn!(user_id = %user.id, "Refresh attempted without an active token");
                ServiceError::unauthorized("Invalid refresh token")
            })?;

        if !digests_match(&hash_token(refresh_token), &stored.token_hash) {
            warn!(user_id = %user.id, "Refresh token does not match the stored token");
            return Err(ServiceError::unauthorized("Invalid refresh token"));
        }

        let access_token = self.jwt_utils.generate_access_token(&user)?;

        Ok(AccessTokenResponse {
            access_token,
            expires_in: self.access_expires_in(),
        })
    }

    /// Revoke every refresh token belonging to the user
    pub async fn logout(&self, user_id: &str) -> ServiceResult<()> {
        let revoked = self.repo.revoke_all_tokens_by_user_id(user_id).await?;
        info!(user_id, revoked, "User logged out");
        Ok(())
    }

    /// Validate a presented token of the `expected` type, collapsing every
    /// failure into `Unauthorized`
    pub fn parse_claims(&self, token: &str, expected: TokenType) -> ServiceResult<Claims> {
        self.jwt_utils.parse(token, expected).map_err(|error| {
            warn!(%error, ?expected, "Rejected token");
            ServiceError::invalid_token("Invalid token", error)
        })
    }

    fn verify_password(password: &str, hash: &str) -> ServiceResult<()> {
        let matches = verify(password, hash).map_err(|e| {
            ServiceError::internal_error(format!("Password verification failed: {}", e))
        })?;

        if matches {
            Ok(())
        } else {
            Err(ServiceError::unauthorized("Invalid password"))
        }
    }
}
