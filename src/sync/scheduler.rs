use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::common::AppState;
use crate::sync::worker::{self, Refresh, Trigger};

/// Run the live-mode poller.
///
/// Fetches immediately on startup, then every `poll_interval_seconds` while the
/// dashboard is in live mode. Custom ranges are left alone until the user
/// returns to live mode.
pub async fn run_poller(state: AppState) {
    let interval_secs = state.config.poll_interval_seconds;
    let retry_delay_secs = state.config.poll_retry_delay_seconds;
    let max_retries = state.config.poll_retry_max;

    tracing::info!(
        interval_secs,
        logger = %state.licor_client.logger_sn(),
        "Starting weather poller"
    );

    let mut ticker = interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // First tick completes immediately
        ticker.tick().await;

        if !state.dashboard.selection().is_live() {
            tracing::debug!("Custom range selected, skipping auto-refresh");
            continue;
        }

        tracing::debug!("Auto-refreshing live data...");

        let mut retries = 0;
        loop {
            match worker::refresh(&state, Trigger::Poll).await {
                Ok(Refresh::Published(snapshot)) => {
                    tracing::debug!(records = snapshot.records.len(), "Poll completed");
                    break;
                }
                Ok(Refresh::Superseded | Refresh::Skipped) => break,
                Err(e) => {
                    retries += 1;
                    if e.is_rate_limited() && retries <= max_retries {
                        tracing::warn!(
                            retry = retries,
                            max_retries,
                            delay_secs = retry_delay_secs,
                            "Poll rate limited, retrying"
                        );
                        tokio::time::sleep(Duration::from_secs(retry_delay_secs)).await;
                    } else if retries <= max_retries {
                        tracing::error!(
                            error = %e,
                            retry = retries,
                            max_retries,
                            "Poll failed, retrying"
                        );
                        tokio::time::sleep(Duration::from_secs(retry_delay_secs)).await;
                    } else {
                        tracing::error!(
                            error = %e,
                            max_retries,
                            "Poll failed after max retries"
                        );
                        break;
                    }
                }
            }
        }
    }
}
