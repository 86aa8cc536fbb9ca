use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::weather::quantity::{normalize, parse_value, Normalized, Quantity};

/// Naive layouts the provider is known to emit; interpreted as UTC.
const NAIVE_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%MZ",
    "%Y-%m-%dT%H:%MZ",
];

/// Date-only timestamps mean midnight UTC.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One timestamped, single-quantity measurement as received from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReading {
    pub timestamp: String,
    pub sensor_type: String,
    pub value: String,
}

impl RawReading {
    pub fn new(
        timestamp: impl Into<String>,
        sensor_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            sensor_type: sensor_type.into(),
            value: value.into(),
        }
    }
}

/// All quantities known at one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompositeRecord {
    /// Timestamp exactly as the provider sent it
    pub timestamp: String,
    /// Parsed instant (null if the provider format was not recognised)
    pub time: Option<DateTime<Utc>>,
    pub air_temperature: Option<f64>,
    pub dew_point: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub gust_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub pressure: Option<f64>,
}

impl CompositeRecord {
    /// A record for `timestamp` with every quantity unknown.
    #[must_use]
    pub fn empty(timestamp: &str) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            time: parse_timestamp(timestamp),
            air_temperature: None,
            dew_point: None,
            relative_humidity: None,
            wind_speed: None,
            gust_speed: None,
            wind_direction: None,
            pressure: None,
        }
    }

    #[must_use]
    pub fn get(&self, quantity: Quantity) -> Option<f64> {
        match quantity {
            Quantity::AirTemperature => self.air_temperature,
            Quantity::DewPoint => self.dew_point,
            Quantity::RelativeHumidity => self.relative_humidity,
            Quantity::WindSpeed => self.wind_speed,
            Quantity::GustSpeed => self.gust_speed,
            Quantity::WindDirection => self.wind_direction,
            Quantity::Pressure => self.pressure,
        }
    }

    pub fn set(&mut self, quantity: Quantity, value: Option<f64>) {
        let slot = match quantity {
            Quantity::AirTemperature => &mut self.air_temperature,
            Quantity::DewPoint => &mut self.dew_point,
            Quantity::RelativeHumidity => &mut self.relative_humidity,
            Quantity::WindSpeed => &mut self.wind_speed,
            Quantity::GustSpeed => &mut self.gust_speed,
            Quantity::WindDirection => &mut self.wind_direction,
            Quantity::Pressure => &mut self.pressure,
        };
        *slot = value;
    }
}

/// Parse a provider timestamp into a UTC instant.
///
/// Accepts RFC 3339 (with offset), naive `YYYY-MM-DD HH:MM[:SS]` forms
/// (UTC, optionally `Z`-suffixed) and bare dates (midnight UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Group raw readings into one composite record per distinct timestamp.
///
/// Readings are applied in input order, so a later reading for the same
/// (timestamp, quantity) pair overwrites an earlier one, even when the later
/// value does not parse. Unmapped labels still create the record for their
/// timestamp but set no field.
///
/// The result is sorted ascending by instant, then by raw timestamp text.
/// Timestamps that do not parse sort after all parsed ones, by their text.
#[must_use]
pub fn aggregate(readings: &[RawReading]) -> Vec<CompositeRecord> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut records: Vec<CompositeRecord> = Vec::new();

    for reading in readings {
        let slot = *index
            .entry(reading.timestamp.as_str())
            .or_insert_with(|| {
                records.push(CompositeRecord::empty(&reading.timestamp));
                records.len() - 1
            });

        if let Normalized::Mapped(quantity) = normalize(&reading.sensor_type) {
            records[slot].set(quantity, parse_value(&reading.value));
        }
    }

    // Raw text breaks ties between equal instants and orders unparsed records,
    // so the output does not depend on input order.
    records.sort_by(|a, b| {
        (a.time.is_none(), a.time, &a.timestamp).cmp(&(b.time.is_none(), b.time, &b.timestamp))
    });
    records
}
