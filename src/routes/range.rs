use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::common::AppState;
use crate::dashboard::RangeSelection;
use crate::error::AppResult;
use crate::routes::snapshot::DashboardResponse;
use crate::sync::worker::{self, Trigger};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LiveRangeRequest {
    /// Window length in hours, ending now
    pub hours: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomRangeRequest {
    /// Start time (ISO 8601)
    pub start: DateTime<Utc>,
    /// End time (ISO 8601)
    pub end: DateTime<Utc>,
}

fn current(state: &AppState) -> Json<DashboardResponse> {
    Json(DashboardResponse::from_snapshot(
        &state.dashboard.snapshot(),
        state.config.poll_interval_seconds,
    ))
}

/// Switch to a live window
///
/// Selects a rolling window of `hours` ending now, fetches it, and resumes
/// auto-refresh.
#[utoipa::path(
    post,
    path = "/api/range",
    request_body = LiveRangeRequest,
    responses(
        (status = 200, description = "Range applied and data refreshed", body = DashboardResponse),
        (status = 400, description = "Invalid window"),
        (status = 502, description = "LI-COR API failure"),
    ),
    tag = "range"
)]
pub async fn set_live_range(
    State(state): State<AppState>,
    Json(request): Json<LiveRangeRequest>,
) -> AppResult<Json<DashboardResponse>> {
    let selection = RangeSelection::live(request.hours, state.config.max_range_hours)?;
    worker::select_and_refresh(&state, selection).await?;
    Ok(current(&state))
}

/// Switch to a custom window
///
/// Fetches a fixed window. Auto-refresh is paused until live mode is
/// selected again.
#[utoipa::path(
    post,
    path = "/api/range/custom",
    request_body = CustomRangeRequest,
    responses(
        (status = 200, description = "Range applied and data refreshed", body = DashboardResponse),
        (status = 400, description = "Invalid window"),
        (status = 502, description = "LI-COR API failure"),
    ),
    tag = "range"
)]
pub async fn set_custom_range(
    State(state): State<AppState>,
    Json(request): Json<CustomRangeRequest>,
) -> AppResult<Json<DashboardResponse>> {
    let selection =
        RangeSelection::custom(request.start, request.end, state.config.max_range_hours)?;
    worker::select_and_refresh(&state, selection).await?;
    Ok(current(&state))
}

/// Return to live mode
///
/// Resets to the default live window and refreshes.
#[utoipa::path(
    post,
    path = "/api/range/live",
    responses(
        (status = 200, description = "Live mode restored", body = DashboardResponse),
        (status = 502, description = "LI-COR API failure"),
    ),
    tag = "range"
)]
pub async fn back_to_live(State(state): State<AppState>) -> AppResult<Json<DashboardResponse>> {
    let selection =
        RangeSelection::live(state.config.default_range_hours, state.config.max_range_hours)?;
    worker::select_and_refresh(&state, selection).await?;
    Ok(current(&state))
}

/// Refresh now
///
/// Re-fetches the current selection, waiting for any refresh already running.
#[utoipa::path(
    post,
    path = "/api/refresh",
    responses(
        (status = 200, description = "Data refreshed", body = DashboardResponse),
        (status = 502, description = "LI-COR API failure"),
    ),
    tag = "range"
)]
pub async fn refresh_now(State(state): State<AppState>) -> AppResult<Json<DashboardResponse>> {
    worker::refresh(&state, Trigger::User).await?;
    Ok(current(&state))
}
