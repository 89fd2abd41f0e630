//! HTTP request handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rand::Rng;
use tracing::error;

use crate::app::{AppState, HealthConfig};
use crate::domain::{AppError, ErrorDetail, ErrorResponse, HealthResponse, HealthStatus};
use crate::infra::render;

/// Sample instrumented endpoint.
///
/// Sleeps a random delay up to the configured maximum, then answers 200 or,
/// with the configured probability, 500.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (delay, status) = roll(state.health());

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    (status.0, Json(HealthResponse::new(status.1)))
}

fn roll(config: &HealthConfig) -> (Duration, (StatusCode, HealthStatus)) {
    let mut rng = rand::thread_rng();
    let max_ms = config.max_delay.as_millis() as u64;
    let delay = if max_ms == 0 {
        Duration::ZERO
    } else {
        Duration::from_millis(rng.gen_range(0..=max_ms))
    };
    let status = if rng.gen_bool(config.failure_probability()) {
        (StatusCode::INTERNAL_SERVER_ERROR, HealthStatus::Unhealthy)
    } else {
        (StatusCode::OK, HealthStatus::Healthy)
    };
    (delay, status)
}

/// Text exposition of every metric in the registry.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let (body, content_type) = render(&state.registry)?;
    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AppError::Metrics(_) => (StatusCode::INTERNAL_SERVER_ERROR, "metrics_error"),
            AppError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        let message = self.to_string();

        if status.is_server_error() {
            error!(error_type = %error_type, message = %message, "Server error");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                r#type: error_type.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}
