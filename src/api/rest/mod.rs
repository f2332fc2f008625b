//! # REST API
//!
//! JSON endpoints over the scoring engine using axum.
//!
//! # Endpoints
//!
//! - `POST /api/v1/score` - Score a batch of entities
//! - `POST /api/v1/match` - Screen a batch against a buy box
//! - `GET /api/v1/health` - Health check
//!
//! Errors use a common envelope:
//!
//! ```json
//! { "error": "validation error: duplicate entity id biz-1", "code": "validation_error" }
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use dealscope::api::rest::{create_router, AppState};
//!
//! let router = create_router(AppState::new(engine));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, AppState, ErrorResponse, HealthResponse};
pub use routes::{MAX_BODY_BYTES, create_router};
