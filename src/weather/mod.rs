//! Reading normalization, per-timestamp aggregation and wind-rose binning.
//!
//! Everything here is pure and synchronous.

pub mod aggregate;
pub mod quantity;
pub mod views;
pub mod wind_rose;

pub use aggregate::{aggregate, parse_timestamp, CompositeRecord, RawReading};
pub use quantity::{normalize, parse_value, Normalized, Quantity};
pub use wind_rose::{octant_index, wind_rose_bins, WindRose};
