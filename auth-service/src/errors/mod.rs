//! Global application error types.
//!
//! Every failure the session layer can produce is one of the variants of
//! [`ServiceError`]. The HTTP boundary pattern-matches on it to pick a status
//! code; the wrapped causes are only ever logged.

use crate::utils::jwt::TokenError;
use thiserror::Error;

/// Service error shared by the repository, codec and session layers
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
        #[source]
        source: Option<TokenError>,
    },

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            source: None,
        }
    }

    /// Unauthorized error that keeps the codec failure for logging.
    pub fn invalid_token(message: impl Into<String>, source: TokenError) -> Self {
        Self::Unauthorized {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// The codec failure behind an `Unauthorized` error, if any.
    pub fn token_error(&self) -> Option<&TokenError> {
        match self {
            Self::Unauthorized { source, .. } => source.as_ref(),
            _ => None,
        }
    }
}
