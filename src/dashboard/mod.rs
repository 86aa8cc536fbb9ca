pub mod store;

pub use store::{DashboardStore, RangeSelection, Snapshot, TimeWindow, LIVE_PRESETS_HOURS};
