//! # REST Routes
//!
//! Router assembly and middleware.

use crate::api::rest::handlers::{self, AppState};
use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Builds the router with tracing, CORS and body-limit layers.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/score", post(handlers::score))
        .route("/api/v1/match", post(handlers::match_entities))
        .route("/api/v1/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %Uuid::new_v4(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
