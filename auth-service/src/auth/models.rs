//! Request and response payloads for the authentication endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Tokens produced by a successful login.
///
/// Only `access_token` goes into the response body; the refresh token is
/// handed to the client in an HTTP-only cookie.
#[derive(Debug)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

/// Access token response for login and refresh
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

impl From<LoginResponse> for AccessTokenResponse {
    fn from(response: LoginResponse) -> Self {
        Self {
            access_token: response.access_token,
            expires_in: response.expires_in,
        }
    }
}
