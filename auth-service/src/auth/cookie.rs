//! Refresh token cookie handling.

use axum::http::{HeaderMap, HeaderValue, header::COOKIE};

pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Builds the `Set-Cookie` value carrying a freshly issued refresh token.
pub fn refresh_cookie(token: &str, max_age_seconds: u64, secure: bool) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        REFRESH_COOKIE_NAME, token, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

/// Builds the `Set-Cookie` value that makes the client drop the refresh token.
pub fn clear_refresh_cookie(secure: bool) -> HeaderValue {
    let cookie = format!(
        "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax{}",
        REFRESH_COOKIE_NAME,
        if secure { "; Secure" } else { "" }
    );
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Reads a cookie value from the request headers.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
