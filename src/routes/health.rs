use axum::{extract::State, http::StatusCode};

use crate::common::AppState;

/// Health check endpoint
///
/// Returns 200 OK if the service is running.
/// This endpoint is not rate-limited and suitable for Kubernetes probes.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "health"
)]
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Readiness check endpoint
///
/// Returns 200 once the first fetch has completed (successfully or not),
/// 503 before that.
#[utoipa::path(
    get,
    path = "/readyz",
    responses(
        (status = 200, description = "First fetch completed"),
        (status = 503, description = "Still waiting for the first fetch"),
    ),
    tag = "health"
)]
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    if state.dashboard.snapshot().fetched_at.is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
