use axum::{
    body::Body,
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;

use crate::auth::password::constant_time_eq;
use crate::error::AppError;

/// Double-submit CSRF check for mutating requests.
///
/// The token lives in a readable cookie and must be echoed back in the
/// `x-csrf-token` header; equality is the whole check, no server-side
/// registry is involved.
pub async fn verify_csrf(cookies: Cookies, req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::GET
        || req.method() == Method::HEAD
        || req.method() == Method::OPTIONS
    {
        tracing::debug!("✅ CSRF exemption: {} request", req.method());
        return next.run(req).await;
    }

    let csrf_token_cookie = match cookies.get("csrf_token") {
        Some(c) => c.value().to_string(),
        None => {
            tracing::warn!("❌ CSRF: Cookie csrf_token não encontrado");
            return AppError::Authentication("Missing CSRF token cookie".to_string())
                .into_response();
        }
    };

    let headers = req.headers();
    let csrf_token_header = match headers
        .get("x-csrf-token")
        .or_else(|| headers.get("X-CSRF-Token"))
    {
        Some(token) => match token.to_str() {
            Ok(t) => t.to_string(),
            Err(_) => {
                tracing::warn!("❌ CSRF: Header com formato inválido");
                return AppError::Authentication("Invalid CSRF token format".to_string())
                    .into_response();
            }
        },
        None => {
            tracing::warn!("❌ CSRF: Header x-csrf-token não encontrado");
            return AppError::Authentication("Missing CSRF token header".to_string())
                .into_response();
        }
    };

    if !constant_time_eq(&csrf_token_cookie, &csrf_token_header) {
        tracing::warn!("❌ CSRF: Tokens não conferem");
        return AppError::Authentication("CSRF token mismatch".to_string()).into_response();
    }

    tracing::debug!("✅ CSRF token válido");
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, middleware::from_fn, routing::post};
    use tower::ServiceExt;
    use tower_cookies::CookieManagerLayer;

    fn app() -> Router {
        Router::new()
            .route("/api/patients", post(|| async { "created" }))
            .layer(from_fn(verify_csrf))
            .layer(CookieManagerLayer::new())
    }

    #[tokio::test]
    async fn mutating_request_without_token_is_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/patients")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn matching_cookie_and_header_pass() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/patients")
                    .header("cookie", "csrf_token=abc123")
                    .header("x-csrf-token", "abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn mismatched_tokens_are_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/patients")
                    .header("cookie", "csrf_token=abc123")
                    .header("x-csrf-token", "other")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
