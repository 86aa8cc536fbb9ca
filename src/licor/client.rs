use chrono::{DateTime, Utc};
use reqwest::{header, Client};
use serde_json::Value;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::licor::models::DataBatch;

/// Datetime layout the v1 `data` endpoint expects (UTC).
const API_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct LicorClient {
    http_client: Client,
    base_url: String,
    api_token: String,
    logger_sn: String,
}

impl LicorClient {
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.licor_request_timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.licor_base_url.clone(),
            api_token: config.licor_api_token.clone(),
            logger_sn: config.licor_logger_sn.clone(),
        })
    }

    #[must_use]
    pub fn logger_sn(&self) -> &str {
        &self.logger_sn
    }

    /// Query parameters for a `[start, end]` window.
    #[must_use]
    pub fn query_params(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> [(&'static str, String); 3] {
        [
            ("loggers", self.logger_sn.clone()),
            ("start_date_time", format_api_datetime(start)),
            ("end_date_time", format_api_datetime(end)),
        ]
    }

    /// Fetch every reading the logger recorded between `start` and `end`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::LicorApi` if the request fails, the API returns an
    /// error status, or the body is not JSON. A JSON body without a `data`
    /// array is not an error and yields an empty batch.
    pub async fn fetch_readings(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<DataBatch> {
        tracing::debug!(
            logger = %self.logger_sn,
            start = %start,
            end = %end,
            "Requesting LI-COR data"
        );

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&self.query_params(start, end))
            .bearer_auth(&self.api_token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::LicorApi(format!("Request failed: {e}")))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::LicorApi("Rate limited (429)".to_string()));
        }

        if !status.is_success() {
            return Err(AppError::LicorApi(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::LicorApi(format!("Failed to get response text: {e}")))?;

        let payload: Value = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body_preview = %text.chars().take(500).collect::<String>(),
                "Failed to parse LI-COR response"
            );
            AppError::LicorApi(format!("Failed to parse response: {e}"))
        })?;

        let batch = DataBatch::from_payload(&payload);
        tracing::debug!(
            readings = batch.readings.len(),
            skipped = batch.skipped,
            truncated = batch.truncated,
            "LI-COR data received"
        );
        Ok(batch)
    }
}

/// Format an instant as `YYYY-MM-DD HH:MM:SS` in UTC.
#[must_use]
pub fn format_api_datetime(instant: DateTime<Utc>) -> String {
    instant.format(API_DATETIME_FORMAT).to_string()
}
