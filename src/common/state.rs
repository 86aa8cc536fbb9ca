use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::dashboard::{DashboardStore, RangeSelection};
use crate::error::AppResult;
use crate::licor::LicorClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub licor_client: Arc<LicorClient>,
    pub dashboard: Arc<DashboardStore>,
    /// Limits concurrent CSV/NDJSON exports
    pub export_permits: Arc<Semaphore>,
}

impl AppState {
    /// Build state starting in live mode with the configured default window.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured default window is invalid.
    pub fn new(config: Config, licor_client: LicorClient) -> AppResult<Self> {
        let selection = RangeSelection::live(config.default_range_hours, config.max_range_hours)?;
        let export_permits = Arc::new(Semaphore::new(config.export_concurrent_limit));

        Ok(Self {
            config: Arc::new(config),
            licor_client: Arc::new(licor_client),
            dashboard: Arc::new(DashboardStore::new(selection)),
            export_permits,
        })
    }
}
