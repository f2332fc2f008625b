//! # REST Handlers
//!
//! Request handlers, shared state and the JSON error envelope.

use crate::application::error::ApplicationError;
use crate::application::services::{
    MatchReport, MatchRequest, ScoringEngine, ScoringReport, ScoringRequest,
};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Scoring engine.
    pub engine: ScoringEngine,
}

impl AppState {
    /// Wraps an engine in shareable state.
    #[must_use]
    pub fn new(engine: ScoringEngine) -> Arc<Self> {
        Arc::new(Self { engine })
    }
}

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Stable machine-readable code.
    pub code: String,
}

/// Health check body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` when the service answers.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Active signal provider.
    pub provider: String,
}

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Returns the HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        let (status, code) = if err.is_validation() {
            (StatusCode::BAD_REQUEST, "validation_error")
        } else if err.is_configuration() {
            (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
        } else {
            match &err {
                ApplicationError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
                ApplicationError::Provider(e) if e.is_retryable() => {
                    (StatusCode::SERVICE_UNAVAILABLE, "provider_unavailable")
                }
                ApplicationError::Provider(_) => (StatusCode::BAD_GATEWAY, "provider_error"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            }
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            code: "invalid_request",
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                status = %self.status,
                code = self.code,
                error = %self.message,
                "Request failed"
            );
        } else {
            warn!(
                status = %self.status,
                code = self.code,
                error = %self.message,
                "Request rejected"
            );
        }
        let body = Json(ErrorResponse {
            error: self.message,
            code: self.code.to_string(),
        });
        (self.status, body).into_response()
    }
}

/// `POST /api/v1/score`
///
/// # Errors
///
/// Returns `400` for malformed JSON or an invalid batch.
pub async fn score(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ScoringRequest>, JsonRejection>,
) -> Result<Json<ScoringReport>, ApiError> {
    let Json(request) = payload?;
    let report = state.engine.score_batch(request).await?;
    Ok(Json(report))
}

/// `POST /api/v1/match`
///
/// # Errors
///
/// Returns `400` for malformed JSON, invalid criteria or an invalid batch.
pub async fn match_entities(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<MatchReport>, ApiError> {
    let Json(request) = payload?;
    let report = state.engine.match_batch(request).await?;
    Ok(Json(report))
}

/// `GET /api/v1/health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.engine.provider_name().to_string(),
    })
}
