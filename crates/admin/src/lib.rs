//! Shopfront Admin library.
//!
//! Product maintenance and order status management. The binary in `main.rs`
//! adds Sentry and serves [`app`].
//!
//! # Security
//!
//! Every page except the login form requires a signed-in account with the
//! `admin` role. Admin accounts are created from the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Directory the admin stylesheet is served from, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/admin/static";

/// Build the admin router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.pool(), state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
            tracing::info_span!(
                "admin_request",
                method = %request.method(),
                uri = %request.uri(),
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::AdminConfig;

    fn offline_app() -> Router {
        let config = AdminConfig::from_vars(|key| match key {
            "ADMIN_DATABASE_URL" => Some("postgres://nobody@127.0.0.1:1/none".to_string()),
            "ADMIN_BASE_URL" => Some("http://localhost:3001".to_string()),
            _ => None,
        })
        .unwrap();
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        app(AppState::new(config, pool))
    }

    #[tokio::test]
    async fn test_pages_require_sign_in() {
        for (method, uri) in [
            ("GET", "/orders"),
            ("GET", "/products"),
            ("GET", "/products/new"),
            ("POST", "/orders/9f8e7d6c-0000-4000-8000-000000000000/status"),
            ("POST", "/products/9f8e7d6c-0000-4000-8000-000000000000/delete"),
        ] {
            let response = offline_app()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                        .body(Body::from("status=shipped"))
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{method} {uri}");
            assert_eq!(response.headers()[header::LOCATION], "/auth/login");
        }
    }

    #[tokio::test]
    async fn test_login_page_renders() {
        let response = offline_app()
            .oneshot(
                Request::builder()
                    .uri("/auth/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    }
}
