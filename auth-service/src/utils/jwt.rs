//! JWT token utilities for authentication.
//!
//! Provides token creation, validation, and the one-way digest used to store
//! refresh tokens without keeping a usable copy.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::User;
use crate::errors::{ServiceError, ServiceResult};

/// JWT claims carried by both access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// User email
    pub email: String,
    /// Unique token id, keeps tokens minted in the same second distinct
    pub jti: String,
    /// Whether this is an access or a refresh token
    pub typ: TokenType,
    /// Token issued at timestamp
    pub iat: usize,
    /// Token expiration timestamp
    pub exp: usize,
}

/// The two kinds of token the service mints.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Why a presented token was rejected.
///
/// Callers report every variant as the same `Unauthorized` failure; the kind
/// is only kept for logs.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
    #[error("token has the wrong type")]
    WrongType,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidSignature
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// JWT token utility for creating and validating tokens
#[derive(Clone)]
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtUtils {
    /// Create a new JwtUtils instance from the loaded configuration
    pub fn new(config: &Config) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        JwtUtils {
            encoding_key,
            decoding_key,
            validation,
            access_ttl: Duration::seconds(config.access_token_ttl_seconds as i64),
            refresh_ttl: Duration::seconds(config.refresh_token_ttl_seconds as i64),
        }
    }

    /// Access token lifetime
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Refresh token lifetime
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Sign a claim set for `user_id`/`email` valid for `ttl` from now
    pub fn issue(
        &self,
        user_id: &str,
        email: &str,
        typ: TokenType,
        ttl: Duration,
    ) -> ServiceResult<String> {
        let now = Utc::now();
        let exp = now + ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            jti: Uuid::now_v7().to_string(),
            typ,
            iat: now.timestamp() as usize,
            exp: exp.timestamp().max(0) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::internal_error(format!("Token generation failed: {}", e)))
    }

    /// Generate a short-lived access token
    pub fn generate_access_token(&self, user: &User) -> ServiceResult<String> {
        self.issue(&user.id, &user.email, TokenType::Access, self.access_ttl)
    }

    /// Generate a refresh token (longer expiration)
    pub fn generate_refresh_token(&self, user: &User) -> ServiceResult<String> {
        self.issue(&user.id, &user.email, TokenType::Refresh, self.refresh_ttl)
    }

    /// Validate and decode a JWT token of the `expected` type
    pub fn parse(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)?;

        if claims.is_expired() {
            return Err(TokenError::Expired);
        }

        if claims.typ != expected {
            return Err(TokenError::WrongType);
        }

        Ok(claims)
    }
}

impl Claims {
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    /// Expiry is exclusive: a token is dead in the second it expires.
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as usize;
        now >= self.exp
    }
}

/// SHA-256 hex digest of a raw refresh token
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time comparison of two token digests
pub fn digests_match(presented: &str, stored: &str) -> bool {
    presented.as_bytes().ct_eq(stored.as_bytes()).into()
}
