pub mod dashboard;
pub mod health;
pub mod range;
pub mod rate_limit;
pub mod records;
pub mod snapshot;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use rate_limit::ClientIpKeyExtractor;

use crate::common::AppState;
use crate::error::{AppError, AppResult};

/// Control requests allowed to wait on the refresh guard at once.
const CONTROL_CONCURRENCY: usize = 4;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        health::readyz,
        snapshot::get_dashboard,
        snapshot::list_series,
        snapshot::get_series,
        snapshot::get_wind_rose,
        snapshot::list_ranges,
        records::get_records,
        range::set_live_range,
        range::set_custom_range,
        range::back_to_live,
        range::refresh_now,
    ),
    components(
        schemas(
            snapshot::DashboardResponse,
            snapshot::RangesResponse,
            snapshot::RangePreset,
            records::RecordsResponse,
            range::LiveRangeRequest,
            range::CustomRangeRequest,
            crate::dashboard::RangeSelection,
            crate::dashboard::TimeWindow,
            crate::weather::CompositeRecord,
            crate::weather::Quantity,
            crate::weather::views::LatestConditions,
            crate::weather::views::ConditionRow,
            crate::weather::views::Thermometer,
            crate::weather::views::TimeSeries,
            crate::weather::views::WindRoseView,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "dashboard", description = "Derived views of the current snapshot"),
        (name = "records", description = "Composite weather records"),
        (name = "range", description = "Time window selection and refresh"),
    ),
    info(
        title = "Station Dash API",
        description = "Weather-station dashboard for LI-COR Cloud loggers",
        version = "0.1.0"
    )
)]
struct ApiDoc;

/// Build the application router.
///
/// # Errors
///
/// Returns `AppError::Internal` if a rate limiter cannot be built from the
/// configured rates (zero per-second or burst values).
pub fn build_router(state: AppState) -> AppResult<Router> {
    let config = &state.config;

    if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
    } else {
        tracing::info!(
            read_rate = %format!("{}/s burst {}", config.rate_limit_read_per_second, config.rate_limit_read_burst),
            control_rate = %format!("{}/s burst {}", config.rate_limit_control_per_second, config.rate_limit_control_burst),
            export_concurrent = config.export_concurrent_limit,
            "Rate limiting configured"
        );
    }

    let read_routes_base = Router::new()
        .route("/dashboard", get(snapshot::get_dashboard))
        .route("/series", get(snapshot::list_series))
        .route("/series/{quantity}", get(snapshot::get_series))
        .route("/wind-rose", get(snapshot::get_wind_rose))
        .route("/ranges", get(snapshot::list_ranges))
        .route("/records", get(records::get_records));

    let control_routes_base = Router::new()
        .route("/range", post(range::set_live_range))
        .route("/range/custom", post(range::set_custom_range))
        .route("/range/live", post(range::back_to_live))
        .route("/refresh", post(range::refresh_now))
        .layer(GlobalConcurrencyLimitLayer::new(CONTROL_CONCURRENCY));

    let api_routes = if config.disable_rate_limiting {
        Router::new()
            .merge(read_routes_base)
            .merge(control_routes_base)
    } else {
        let read_limiter = GovernorConfigBuilder::default()
            .key_extractor(ClientIpKeyExtractor)
            .per_second(config.rate_limit_read_per_second)
            .burst_size(config.rate_limit_read_burst)
            .finish()
            .ok_or_else(|| AppError::Internal("Invalid read rate limit settings".to_string()))?;

        let control_limiter = GovernorConfigBuilder::default()
            .key_extractor(ClientIpKeyExtractor)
            .per_second(config.rate_limit_control_per_second)
            .burst_size(config.rate_limit_control_burst)
            .finish()
            .ok_or_else(|| AppError::Internal("Invalid control rate limit settings".to_string()))?;

        Router::new()
            .merge(read_routes_base.layer(GovernorLayer {
                config: Arc::new(read_limiter),
            }))
            .merge(control_routes_base.layer(GovernorLayer {
                config: Arc::new(control_limiter),
            }))
    }
    .layer(RequestBodyLimitLayer::new(64 * 1024)); // control bodies are tiny

    // Health check routes (NO rate limiting)
    let health_routes = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    Ok(Router::new()
        .route("/", get(dashboard::dashboard))
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
