//! Help Desk Server - ticketing and CRM web application.
//!
//! # Architecture
//!
//! - Axum web framework with server-rendered Askama templates
//! - `PostgreSQL` via sqlx for all data, including sessions
//! - Local email/password accounts hashed with Argon2
//! - Authorization gate as extractors over [`helpdesk_core::AuthContext`]
//!
//! Every page reads on request. Writes are form posts that redirect back
//! to the page (Post/Redirect/Get) with a flash notification.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionManagerLayer;
use tower_sessions::session_store::SessionStore as SessionBackend;
use tracing::Span;

use state::AppState;

/// Embedded migrations from `crates/server/migrations`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Directory the `/static` assets are served from, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/server/static";

/// Build the application router with its middleware stack.
///
/// Layer order (outermost first) is documented in [`middleware`].
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionBackend + Clone,
{
    Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use helpdesk_core::routes::{Access, ROUTES};

    use super::*;
    use crate::config::ServerConfig;

    /// App over a pool that never connects. Requests that reach the database fail.
    fn test_app() -> Router {
        let config = ServerConfig::from_lookup(|key| {
            (key == "HELPDESK_DATABASE_URL").then(|| "postgres://localhost/helpdesk_test".to_string())
        })
        .unwrap();
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://localhost/helpdesk_test")
            .unwrap();
        app(
            AppState::new(config, pool),
            SessionManagerLayer::new(MemoryStore::default()),
        )
    }

    async fn get(path: &str) -> axum::response::Response {
        test_app()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_protected_pages_redirect_anonymous_visitors() {
        for spec in ROUTES.iter().filter(|s| s.access == Access::Protected) {
            let response = get(spec.path).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", spec.path);
            assert_eq!(response.headers()[header::LOCATION], "/auth", "{}", spec.path);
        }
    }

    #[tokio::test]
    async fn test_public_pages_render() {
        for spec in ROUTES.iter().filter(|s| s.access == Access::Public) {
            assert_eq!(get(spec.path).await.status(), StatusCode::OK, "{}", spec.path);
        }
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        assert_eq!(get("/nope").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_requires_session() {
        assert_eq!(get("/api/me").await.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_liveness_and_headers() {
        let response = get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().contains_key(header::CONTENT_SECURITY_POLICY));
    }
}
