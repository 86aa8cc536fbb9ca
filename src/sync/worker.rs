use chrono::Utc;
use std::sync::Arc;

use crate::common::AppState;
use crate::dashboard::{RangeSelection, Snapshot};
use crate::error::AppResult;
use crate::weather;

/// What asked for a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The live-mode timer; skipped if another refresh is running
    Poll,
    /// A user action; waits for any running refresh
    User,
}

/// Outcome of a refresh attempt.
#[derive(Debug, Clone)]
pub enum Refresh {
    Published(Arc<Snapshot>),
    /// The selection changed while fetching; a newer refresh will publish
    Superseded,
    /// Another refresh was in flight (poll trigger only)
    Skipped,
}

/// Fetch, aggregate and publish a snapshot for the current selection.
///
/// On an upstream failure, a snapshot carrying the error and no records is
/// published before the error is returned.
///
/// # Errors
///
/// Returns the upstream `AppError::LicorApi` when the fetch fails.
pub async fn refresh(state: &AppState, trigger: Trigger) -> AppResult<Refresh> {
    let _guard = match trigger {
        Trigger::User => state.dashboard.lock_refresh().await,
        Trigger::Poll => match state.dashboard.try_lock_refresh() {
            Some(guard) => guard,
            None => {
                tracing::debug!("Refresh already in flight, skipping poll");
                return Ok(Refresh::Skipped);
            }
        },
    };

    let selection = state.dashboard.selection();
    if trigger == Trigger::Poll && !selection.is_live() {
        return Ok(Refresh::Skipped);
    }

    let now = Utc::now();
    let window = selection.window(now);

    let batch = match state.licor_client.fetch_readings(window.start, window.end).await {
        Ok(batch) => batch,
        Err(e) => {
            tracing::error!(error = %e, selection = ?selection, "Failed to fetch weather data");
            state
                .dashboard
                .publish(Snapshot::failed(selection, window, e.to_string(), now));
            return Err(e);
        }
    };

    if batch.truncated {
        tracing::warn!(
            message = ?batch.message,
            "LI-COR truncated the result set; window may be incomplete"
        );
    }

    let records = weather::aggregate(&batch.readings);
    if records.is_empty() {
        tracing::warn!(start = %window.start, end = %window.end, "LI-COR returned no data");
    } else {
        tracing::info!(
            readings = batch.readings.len(),
            records = records.len(),
            "Weather data refreshed"
        );
    }

    Ok(publish(state, Snapshot::loaded(selection, window, records, now)))
}

/// Switch selection and refresh for it.
///
/// # Errors
///
/// Returns the upstream error if the fetch for the new selection fails.
pub async fn select_and_refresh(state: &AppState, selection: RangeSelection) -> AppResult<Refresh> {
    tracing::info!(selection = ?selection, "Range selection changed");
    state.dashboard.select(selection);
    refresh(state, Trigger::User).await
}

fn publish(state: &AppState, snapshot: Snapshot) -> Refresh {
    if state.dashboard.publish(snapshot) {
        Refresh::Published(state.dashboard.snapshot())
    } else {
        Refresh::Superseded
    }
}
