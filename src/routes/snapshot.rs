use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::AppState;
use crate::dashboard::{RangeSelection, Snapshot, TimeWindow, LIVE_PRESETS_HOURS};
use crate::error::{AppError, AppResult};
use crate::weather::views::{self, LatestConditions, Thermometer, TimeSeries, WindRoseView};
use crate::weather::Quantity;

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub selection: RangeSelection,
    /// Window of the displayed records (null before the first fetch)
    pub window: Option<TimeWindow>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub loading: bool,
    /// Last upstream error, shown instead of the panels
    pub error: Option<String>,
    pub record_count: usize,
    /// Auto-refresh period in live mode
    pub poll_interval_seconds: u64,
    pub latest: Option<LatestConditions>,
    pub thermometer: Option<Thermometer>,
    pub wind_rose: WindRoseView,
}

impl DashboardResponse {
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot, poll_interval_seconds: u64) -> Self {
        let records = snapshot.records.as_slice();
        Self {
            selection: snapshot.selection,
            window: snapshot.window,
            fetched_at: snapshot.fetched_at,
            loading: snapshot.loading,
            error: snapshot.error.clone(),
            record_count: records.len(),
            poll_interval_seconds,
            latest: views::latest_conditions(records),
            thermometer: views::thermometer(records),
            wind_rose: views::wind_rose_view(records),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RangePreset {
    pub label: String,
    pub hours: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RangesResponse {
    pub presets: Vec<RangePreset>,
    pub default_hours: u32,
    pub max_hours: u32,
}

/// Current dashboard state
///
/// Latest conditions, thermometer and wind rose for the current snapshot.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Current dashboard snapshot", body = DashboardResponse),
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let snapshot = state.dashboard.snapshot();
    Json(DashboardResponse::from_snapshot(
        &snapshot,
        state.config.poll_interval_seconds,
    ))
}

/// Time series for every quantity
#[utoipa::path(
    get,
    path = "/api/series",
    responses(
        (status = 200, description = "One series per quantity", body = Vec<TimeSeries>),
    ),
    tag = "dashboard"
)]
pub async fn list_series(State(state): State<AppState>) -> Json<Vec<TimeSeries>> {
    let snapshot = state.dashboard.snapshot();
    Json(
        Quantity::ALL
            .into_iter()
            .map(|q| views::series(&snapshot.records, q))
            .collect(),
    )
}

/// Time series for one quantity
#[utoipa::path(
    get,
    path = "/api/series/{quantity}",
    params(
        ("quantity" = String, Path, description = "Quantity key, e.g. airTemperature"),
    ),
    responses(
        (status = 200, description = "Series retrieved successfully", body = TimeSeries),
        (status = 404, description = "Unknown quantity"),
    ),
    tag = "dashboard"
)]
pub async fn get_series(
    State(state): State<AppState>,
    Path(quantity): Path<String>,
) -> AppResult<Json<TimeSeries>> {
    let quantity: Quantity = quantity
        .parse()
        .map_err(|e: crate::weather::quantity::UnknownQuantity| AppError::NotFound(e.to_string()))?;

    let snapshot = state.dashboard.snapshot();
    Ok(Json(views::series(&snapshot.records, quantity)))
}

/// Wind rose histogram
///
/// Cumulative wind speed per compass octant (N, NE, E, SE, S, SW, W, NW).
#[utoipa::path(
    get,
    path = "/api/wind-rose",
    responses(
        (status = 200, description = "Wind rose bins", body = WindRoseView),
    ),
    tag = "dashboard"
)]
pub async fn get_wind_rose(State(state): State<AppState>) -> Json<WindRoseView> {
    let snapshot = state.dashboard.snapshot();
    Json(views::wind_rose_view(&snapshot.records))
}

/// Live-mode window presets
#[utoipa::path(
    get,
    path = "/api/ranges",
    responses(
        (status = 200, description = "Available presets", body = RangesResponse),
    ),
    tag = "range"
)]
pub async fn list_ranges(State(state): State<AppState>) -> Json<RangesResponse> {
    Json(RangesResponse {
        presets: LIVE_PRESETS_HOURS
            .into_iter()
            .map(|hours| RangePreset {
                label: format!("{hours} h"),
                hours,
            })
            .collect(),
        default_hours: state.config.default_range_hours,
        max_hours: state.config.max_range_hours,
    })
}
