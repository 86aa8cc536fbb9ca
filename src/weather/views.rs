//! Derived, render-ready views over an ordered record sequence.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::weather::aggregate::CompositeRecord;
use crate::weather::quantity::Quantity;
use crate::weather::wind_rose::{wind_rose_bins, OCTANT_COLORS, OCTANT_LABELS};

/// Thermometer scale bounds in °C.
pub const THERMOMETER_MIN: f64 = -20.0;
pub const THERMOMETER_MAX: f64 = 50.0;

const MISSING: &str = "--";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ConditionRow {
    pub key: Quantity,
    pub label: &'static str,
    pub value: Option<f64>,
    /// Value to two decimals, or `--` when unknown
    pub display: String,
    pub unit: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LatestConditions {
    pub timestamp: String,
    /// Parsed instant of the latest record, for local-time display
    pub time: Option<DateTime<Utc>>,
    pub rows: Vec<ConditionRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Thermometer {
    pub temperature: Option<f64>,
    /// Fill fraction of the gauge, 0.0..=1.0
    pub fill: f64,
    /// Temperature to one decimal with unit (null when unknown)
    pub display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TimeSeries {
    pub key: Quantity,
    pub label: &'static str,
    pub unit: &'static str,
    pub color: &'static str,
    /// Display timestamps, same length as `values`
    pub labels: Vec<String>,
    /// Values (null for unknown)
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WindRoseView {
    pub labels: Vec<&'static str>,
    pub colors: Vec<&'static str>,
    /// Cumulative wind speed per octant (m/s)
    pub bins: Vec<f64>,
}

/// `2025-01-01T12:00:00Z` -> `2025-01-01 12:00:00`.
#[must_use]
pub fn display_timestamp(raw: &str) -> String {
    raw.replacen('T', " ", 1).chars().take(19).collect()
}

/// Format `value` with `digits` decimals, rounding exact halves away from zero.
///
/// Unlike `format!("{:.N}")`, which rounds ties to even (`0.125` to `0.12`),
/// exact halves round up (`0.13`). Rounding works on the exact decimal
/// expansion, so `1.005` (stored just below) still gives `1.00`.
#[must_use]
pub fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // 1074 fractional digits hold the exact expansion of any f64
    let exact = format!("{:.1074}", value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));

    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(digits))
        .collect();
    if frac_part.as_bytes().get(digits).is_some_and(|d| *d >= b'5') {
        round_up(&mut kept);
    }

    let (int_digits, frac_digits) = kept.split_at(kept.len() - digits);
    let mut out = String::with_capacity(kept.len() + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.extend(int_digits.iter().map(|b| char::from(*b)));
    if digits > 0 {
        out.push('.');
        out.extend(frac_digits.iter().map(|b| char::from(*b)));
    }
    out
}

/// Add one unit in the last place of an ASCII digit string.
fn round_up(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

/// Latest value of every quantity, from the last record.
#[must_use]
pub fn latest_conditions(records: &[CompositeRecord]) -> Option<LatestConditions> {
    let latest = records.last()?;
    let timestamp = display_timestamp(&latest.timestamp);

    let rows = Quantity::ALL
        .into_iter()
        .map(|q| {
            let value = latest.get(q);
            ConditionRow {
                key: q,
                label: q.label(),
                value,
                display: value.map_or_else(|| MISSING.to_string(), |v| to_fixed(v, 2)),
                unit: q.unit(),
                timestamp: timestamp.clone(),
            }
        })
        .collect();

    Some(LatestConditions {
        timestamp,
        time: latest.time,
        rows,
    })
}

/// Thermometer gauge for the latest air temperature.
#[must_use]
pub fn thermometer(records: &[CompositeRecord]) -> Option<Thermometer> {
    let temperature = records.last()?.air_temperature;

    let fill = temperature.map_or(0.0, |t| {
        ((t - THERMOMETER_MIN) / (THERMOMETER_MAX - THERMOMETER_MIN)).clamp(0.0, 1.0)
    });

    Some(Thermometer {
        temperature,
        fill,
        display: temperature.map(|t| format!("{}°C", to_fixed(t, 1))),
    })
}

#[must_use]
pub fn series(records: &[CompositeRecord], quantity: Quantity) -> TimeSeries {
    TimeSeries {
        key: quantity,
        label: quantity.chart_label(),
        unit: quantity.unit(),
        color: quantity.chart_color(),
        labels: records.iter().map(|r| display_timestamp(&r.timestamp)).collect(),
        values: records.iter().map(|r| r.get(quantity)).collect(),
    }
}

#[must_use]
pub fn wind_rose_view(records: &[CompositeRecord]) -> WindRoseView {
    WindRoseView {
        labels: OCTANT_LABELS.to_vec(),
        colors: OCTANT_COLORS.to_vec(),
        bins: wind_rose_bins(records).bins.to_vec(),
    }
}
