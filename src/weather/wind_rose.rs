use serde::Serialize;

use crate::weather::aggregate::CompositeRecord;

pub const OCTANTS: usize = 8;

/// Compass octant labels, clockwise from north.
pub const OCTANT_LABELS: [&str; OCTANTS] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Chart fill colour per octant.
pub const OCTANT_COLORS: [&str; OCTANTS] = [
    "#60a5fa", "#38bdf8", "#34d399", "#fbbf24", "#f87171", "#a78bfa", "#f472b6", "#facc15",
];

/// Cumulative wind speed per compass octant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WindRose {
    pub bins: [f64; OCTANTS],
}

impl WindRose {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.bins.iter().sum()
    }
}

/// Octant index for a direction in degrees. Octant 0 spans 337.5°..22.5°.
///
/// Negative and >360° directions wrap.
#[must_use]
pub fn octant_index(direction: f64) -> usize {
    let shifted = (direction + 22.5).rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    ((shifted / 45.0).floor() as usize) % OCTANTS
}

/// Sum wind speed per octant over every record with both direction and speed.
///
/// Negative speeds are skipped so every bin stays non-negative.
#[must_use]
pub fn wind_rose_bins(records: &[CompositeRecord]) -> WindRose {
    records
        .iter()
        .filter_map(|r| match (r.wind_direction, r.wind_speed) {
            (Some(direction), Some(speed)) if speed >= 0.0 => Some((direction, speed)),
            _ => None,
        })
        .fold(WindRose::default(), |mut rose, (direction, speed)| {
            rose.bins[octant_index(direction)] += speed;
            rose
        })
}
