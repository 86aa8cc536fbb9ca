use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// The seven physical quantities a composite record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Quantity {
    AirTemperature,
    DewPoint,
    RelativeHumidity,
    WindSpeed,
    GustSpeed,
    WindDirection,
    Pressure,
}

impl Quantity {
    /// All quantities in display order.
    pub const ALL: [Self; 7] = [
        Self::AirTemperature,
        Self::DewPoint,
        Self::RelativeHumidity,
        Self::WindSpeed,
        Self::GustSpeed,
        Self::WindDirection,
        Self::Pressure,
    ];

    /// Field name used in JSON and URLs (`airTemperature`, ...).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::AirTemperature => "airTemperature",
            Self::DewPoint => "dewPoint",
            Self::RelativeHumidity => "relativeHumidity",
            Self::WindSpeed => "windSpeed",
            Self::GustSpeed => "gustSpeed",
            Self::WindDirection => "windDirection",
            Self::Pressure => "pressure",
        }
    }

    /// Short label for the latest-conditions table.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AirTemperature => "Air Temp",
            Self::DewPoint => "Dew Point",
            Self::RelativeHumidity => "Rel. Humidity",
            Self::WindSpeed => "Wind Speed",
            Self::GustSpeed => "Gust Speed",
            Self::WindDirection => "Wind Dir",
            Self::Pressure => "Pressure",
        }
    }

    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::AirTemperature | Self::DewPoint => "°C",
            Self::RelativeHumidity => "%",
            Self::WindSpeed | Self::GustSpeed => "m/s",
            Self::WindDirection => "°",
            Self::Pressure => "mbar",
        }
    }

    /// Axis title for the time-series chart.
    #[must_use]
    pub const fn chart_label(self) -> &'static str {
        match self {
            Self::AirTemperature => "Air Temp (°C)",
            Self::DewPoint => "Dew Point (°C)",
            Self::RelativeHumidity => "Rel. Humidity (%)",
            Self::WindSpeed => "Wind Speed (m/s)",
            Self::GustSpeed => "Gust Speed (m/s)",
            Self::WindDirection => "Wind Dir (°)",
            Self::Pressure => "Pressure (mbar)",
        }
    }

    #[must_use]
    pub const fn chart_color(self) -> &'static str {
        match self {
            Self::AirTemperature => "#f87171",
            Self::DewPoint => "#fbbf24",
            Self::RelativeHumidity => "#60a5fa",
            Self::WindSpeed => "#34d399",
            Self::GustSpeed => "#a78bfa",
            Self::WindDirection => "#f472b6",
            Self::Pressure => "#facc15",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown quantity: {0}")]
pub struct UnknownQuantity(pub String);

impl FromStr for Quantity {
    type Err = UnknownQuantity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|q| q.key() == s)
            .ok_or_else(|| UnknownQuantity(s.to_string()))
    }
}

/// Outcome of mapping a provider sensor label onto a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalized {
    Mapped(Quantity),
    /// Label outside the known vocabulary; the reading is dropped.
    Unmapped,
}

/// Map a provider sensor-type label onto a quantity.
///
/// Matching is exact and case-sensitive. The provider's naming vocabulary is
/// not fixed, so unknown labels are reported as [`Normalized::Unmapped`]
/// rather than treated as errors.
#[must_use]
pub fn normalize(label: &str) -> Normalized {
    let quantity = match label {
        "Temperature" | "Air Temperature" => Quantity::AirTemperature,
        "Dew Point" => Quantity::DewPoint,
        "RH" | "Relative Humidity" => Quantity::RelativeHumidity,
        "Wind Speed" => Quantity::WindSpeed,
        "Gust" | "Gust Speed" => Quantity::GustSpeed,
        "Wind Direction" => Quantity::WindDirection,
        "Pressure" => Quantity::Pressure,
        _ => return Normalized::Unmapped,
    };
    Normalized::Mapped(quantity)
}

/// Parse the leading decimal number of a raw reading value.
///
/// Trailing text is ignored, so `"12.5 °C"` reads as 12.5 and `"1,5"` as 1.
/// Input without a leading number, or with a non-finite one, is unknown.
#[must_use]
pub fn parse_value(raw: &str) -> Option<f64> {
    let raw = raw.trim_start();
    raw[..numeric_prefix_len(raw)]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Length of the longest `[+-]digits[.digits][(e|E)[+-]digits]` prefix.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    end
}
