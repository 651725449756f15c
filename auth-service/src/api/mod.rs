//! Top-level HTTP surface.
//!
//! Assembles the application router: the service banner at `/` and the
//! authentication routes under `/auth`, with the shared service and cookie
//! policy attached as extensions.

pub mod common;

use crate::api::common::ApiResponse;
use crate::auth::handlers::CookiePolicy;
use crate::auth::service::AuthService;
use axum::{Extension, Router, response::Json, routing::get};
use std::sync::Arc;

/// Builds the full application router.
pub fn app(auth_service: Arc<AuthService>, policy: CookiePolicy) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .nest("/auth", crate::auth::routes::auth_router())
        .layer(Extension(auth_service))
        .layer(Extension(policy))
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "auth-service",
            "version": env!("CARGO_PKG_VERSION")
        }),
        "Welcome to the authentication API",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::AccessTokenResponse;
    use crate::repositories::auth_repository::SqliteAuthRepository;
    use crate::test_support::{seed_user, test_config, test_pool};
    use crate::utils::jwt::{Claims, JwtUtils, TokenType};
    use axum::{
        body::{Body, to_bytes},
        http::{
            Request, StatusCode,
            header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE},
        },
        response::Response,
    };
    use tower::ServiceExt;

    async fn test_app(secure: bool) -> Router {
        let pool = test_pool().await;
        seed_user(&pool, "a@example.com", "secret").await;
        let service = AuthService::new(
            Arc::new(SqliteAuthRepository::new(pool)),
            JwtUtils::new(&test_config()),
        );
        app(
            Arc::new(service),
            CookiePolicy {
                secure,
                max_age_seconds: 604800,
            },
        )
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    fn login_request(email: &str, password: &str) -> Request<Body> {
        Request::post("/auth/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "email": email, "password": password }).to_string(),
            ))
            .unwrap()
    }

    fn with_cookie(method: &str, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(COOKIE, format!("refresh_token={}", token))
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Logs in and returns (access token, raw refresh token, Set-Cookie value).
    async fn login(app: &Router) -> (String, String, String) {
        let response = send(app, login_request("a@example.com", "secret")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let refresh = set_cookie
            .strip_prefix("refresh_token=")
            .and_then(|rest| rest.split(';').next())
            .unwrap()
            .to_string();

        let body: AccessTokenResponse = json_body(response).await;
        (body.access_token, refresh, set_cookie)
    }

    #[tokio::test]
    async fn test_login_sets_http_only_cookie() {
        let app = test_app(false).await;

        let (access, refresh, set_cookie) = login(&app).await;

        assert!(!access.is_empty());
        assert!(!refresh.is_empty());
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("Max-Age=604800"));
        assert!(!set_cookie.contains("Secure"));
    }

    #[tokio::test]
    async fn test_production_cookie_is_secure() {
        let app = test_app(true).await;

        let (_, _, set_cookie) = login(&app).await;

        assert!(set_cookie.contains("Secure"));
    }

    #[tokio::test]
    async fn test_login_failures() {
        let app = test_app(false).await;

        let response = send(&app, login_request("a@example.com", "wrong")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send(&app, login_request("b@example.com", "secret")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, login_request("not-an-email", "secret")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ApiResponse<()> = json_body(response).await;
        assert_eq!(body.error.unwrap().error_type, "validation_error");
    }

    fn raw_login_request(content_type: Option<&str>, body: &'static str) -> Request<Body> {
        let mut builder = Request::post("/auth/login");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_unreadable_login_payload_uses_error_envelope() {
        let app = test_app(false).await;

        let requests = [
            raw_login_request(Some("application/json"), r#"{"email":"a@example.com"}"#),
            raw_login_request(
                Some("application/json"),
                r#"{"email":"a@example.com","password":42}"#,
            ),
            raw_login_request(None, r#"{"email":"a@example.com","password":"secret"}"#),
            raw_login_request(Some("application/json"), r#"{"email":"a@exam"#),
        ];

        for request in requests {
            let response = send(&app, request).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body: ApiResponse<()> = json_body(response).await;
            assert!(!body.success);
            assert_eq!(body.message, "Invalid request payload");
            assert_eq!(body.error.unwrap().error_type, "validation_error");
        }
    }

    #[tokio::test]
    async fn test_refresh_lifecycle() {
        let app = test_app(false).await;

        let (first_access, first_refresh, _) = login(&app).await;

        let response = send(&app, with_cookie("GET", "/auth/refresh", &first_refresh)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: AccessTokenResponse = json_body(response).await;
        assert_ne!(body.access_token, first_access);

        let (_, second_refresh, _) = login(&app).await;

        let response = send(&app, with_cookie("GET", "/auth/refresh", &first_refresh)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send(&app, with_cookie("GET", "/auth/refresh", &second_refresh)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_refresh_without_cookie_is_unauthorized() {
        let app = test_app(false).await;

        let request = Request::get("/auth/refresh").body(Body::empty()).unwrap();
        let response = send(&app, request).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie_and_revokes() {
        let app = test_app(false).await;
        let (_, refresh, _) = login(&app).await;

        let response = send(&app, with_cookie("POST", "/auth/logout", &refresh)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cleared = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cleared.starts_with("refresh_token=;"));
        assert!(cleared.contains("Max-Age=0"));

        let response = send(&app, with_cookie("GET", "/auth/refresh", &refresh)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // A second logout with the same (still well-signed) cookie is a no-op.
        let response = send(&app, with_cookie("POST", "/auth/logout", &refresh)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_claims_requires_bearer_token() {
        let app = test_app(false).await;
        let (access, _, _) = login(&app).await;

        let request = Request::get("/auth/claims").body(Body::empty()).unwrap();
        assert_eq!(send(&app, request).await.status(), StatusCode::UNAUTHORIZED);

        let request = Request::get("/auth/claims")
            .header(AUTHORIZATION, format!("Token {}", access))
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&app, request).await.status(), StatusCode::UNAUTHORIZED);

        let request = Request::get("/auth/claims")
            .header(AUTHORIZATION, "Bearer garbage")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&app, request).await.status(), StatusCode::UNAUTHORIZED);

        let request = Request::get("/auth/claims")
            .header(AUTHORIZATION, format!("Bearer {}", access))
            .body(Body::empty())
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let claims: Claims = json_body(response).await;
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.typ, TokenType::Access);
    }

    #[tokio::test]
    async fn test_token_types_are_bound_to_their_endpoints() {
        let app = test_app(false).await;
        let (access, refresh, _) = login(&app).await;

        let request = Request::get("/auth/claims")
            .header(AUTHORIZATION, format!("Bearer {}", refresh))
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&app, request).await.status(), StatusCode::UNAUTHORIZED);

        let response = send(&app, with_cookie("GET", "/auth/refresh", &access)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send(&app, with_cookie("POST", "/auth/logout", &access)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send(&app, with_cookie("GET", "/auth/refresh", &refresh)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_service_banners() {
        let app = test_app(false).await;

        let response = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Request::get("/auth").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = json_body(response).await;
        assert_eq!(body.message, "This is the auth service");
    }
}
