use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::weather::RawReading;

/// One entry of the `data` array returned by `GET /v1/data`.
///
/// Only the fields the dashboard needs are read. Units and serial numbers
/// are ignored: each quantity has a fixed display unit.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiReading {
    pub timestamp: String,
    pub sensor_measurement_type: String,
    /// Usually a decimal string; some loggers send a bare number
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: String,
}

impl From<ApiReading> for RawReading {
    fn from(api: ApiReading) -> Self {
        Self {
            timestamp: api.timestamp,
            sensor_type: api.sensor_measurement_type,
            value: api.value,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// A decoded `GET /v1/data` body: `{ data: [...], max_results, message }`.
#[derive(Debug, Clone, Default)]
pub struct DataBatch {
    pub readings: Vec<RawReading>,
    /// Entries in `data` that were not readings (missing timestamp or label)
    pub skipped: usize,
    /// Provider set `max_results`, meaning the window was truncated
    pub truncated: bool,
    pub message: Option<String>,
}

impl DataBatch {
    /// Extract readings from a raw JSON payload.
    ///
    /// A payload without a `data` array is not an error: it yields an empty
    /// batch. Individual malformed entries are counted and skipped.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Self {
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        let truncated = payload
            .get("max_results")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let Some(items) = payload.get("data").and_then(Value::as_array) else {
            tracing::warn!(message = ?message, "Unexpected LI-COR response format: no data array");
            return Self {
                truncated,
                message,
                ..Self::default()
            };
        };

        let mut skipped = 0;
        let readings = items
            .iter()
            .filter_map(|item| match ApiReading::deserialize(item) {
                Ok(reading) => Some(RawReading::from(reading)),
                Err(e) => {
                    skipped += 1;
                    tracing::debug!(error = %e, "Skipping malformed reading");
                    None
                }
            })
            .collect();

        Self {
            readings,
            skipped,
            truncated,
            message,
        }
    }
}
