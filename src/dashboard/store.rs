use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, MutexGuard};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::weather::CompositeRecord;

/// Live-mode window presets offered to the user, in hours.
pub const LIVE_PRESETS_HOURS: [u32; 4] = [1, 6, 12, 24];

/// Which time window the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RangeSelection {
    /// Rolling window ending now; auto-refreshed by the poller
    Live { hours: u32 },
    /// Fixed window; not auto-refreshed
    Custom {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl RangeSelection {
    /// Validate and build a live selection.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if `hours` is zero or above `max_hours`.
    pub fn live(hours: u32, max_hours: u32) -> AppResult<Self> {
        if hours == 0 || hours > max_hours {
            return Err(AppError::BadRequest(format!(
                "hours must be between 1 and {max_hours}"
            )));
        }
        Ok(Self::Live { hours })
    }

    /// Validate and build a custom selection.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if `end <= start` or the span exceeds `max_hours`.
    pub fn custom(start: DateTime<Utc>, end: DateTime<Utc>, max_hours: u32) -> AppResult<Self> {
        if end <= start {
            return Err(AppError::BadRequest(
                "end time must be after start time".to_string(),
            ));
        }
        if end - start > Duration::hours(i64::from(max_hours)) {
            return Err(AppError::BadRequest(format!(
                "time range must not exceed {max_hours} hours"
            )));
        }
        Ok(Self::Custom { start, end })
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }

    /// Concrete window for a fetch issued at `now`.
    #[must_use]
    pub fn window(&self, now: DateTime<Utc>) -> TimeWindow {
        match *self {
            Self::Live { hours } => TimeWindow {
                start: now - Duration::hours(i64::from(hours)),
                end: now,
            },
            Self::Custom { start, end } => TimeWindow { start, end },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Immutable dashboard state for one render cycle.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub selection: RangeSelection,
    /// Window the records were fetched for (None before the first fetch)
    pub window: Option<TimeWindow>,
    pub records: Arc<Vec<CompositeRecord>>,
    pub fetched_at: Option<DateTime<Utc>>,
    /// A refresh for `selection` has been requested but not yet published
    pub loading: bool,
    pub error: Option<String>,
}

impl Snapshot {
    #[must_use]
    pub fn initial(selection: RangeSelection) -> Self {
        Self {
            selection,
            window: None,
            records: Arc::new(Vec::new()),
            fetched_at: None,
            loading: true,
            error: None,
        }
    }

    /// Result of a successful fetch.
    #[must_use]
    pub fn loaded(
        selection: RangeSelection,
        window: TimeWindow,
        records: Vec<CompositeRecord>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            selection,
            window: Some(window),
            records: Arc::new(records),
            fetched_at: Some(fetched_at),
            loading: false,
            error: None,
        }
    }

    /// Result of a failed fetch: no records, error kept for display.
    #[must_use]
    pub fn failed(
        selection: RangeSelection,
        window: TimeWindow,
        error: String,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            selection,
            window: Some(window),
            records: Arc::new(Vec::new()),
            fetched_at: Some(fetched_at),
            loading: false,
            error: Some(error),
        }
    }
}

/// Holds the current snapshot and serializes refreshes.
///
/// Snapshots are replaced wholesale; readers get an `Arc` that never changes
/// under them.
pub struct DashboardStore {
    current: watch::Sender<Arc<Snapshot>>,
    refresh_guard: Mutex<()>,
}

impl DashboardStore {
    #[must_use]
    pub fn new(selection: RangeSelection) -> Self {
        let (current, _) = watch::channel(Arc::new(Snapshot::initial(selection)));
        Self {
            current,
            refresh_guard: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.borrow().clone()
    }

    #[must_use]
    pub fn selection(&self) -> RangeSelection {
        self.current.borrow().selection
    }

    /// Receive every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.current.subscribe()
    }

    /// Switch to `selection`, keeping the previous records on screen until
    /// the next publish.
    pub fn select(&self, selection: RangeSelection) {
        self.current.send_modify(|current| {
            let mut next = (**current).clone();
            next.selection = selection;
            next.loading = true;
            next.error = None;
            *current = Arc::new(next);
        });
    }

    /// Publish `snapshot` unless the selection changed since it was fetched.
    ///
    /// Returns whether the snapshot was published.
    pub fn publish(&self, snapshot: Snapshot) -> bool {
        self.current.send_if_modified(|current| {
            if current.selection != snapshot.selection {
                tracing::debug!(
                    fetched_for = ?snapshot.selection,
                    current = ?current.selection,
                    "Discarding snapshot for superseded selection"
                );
                return false;
            }
            *current = Arc::new(snapshot);
            true
        })
    }

    /// Wait for any in-flight refresh to finish, then hold the guard.
    pub async fn lock_refresh(&self) -> MutexGuard<'_, ()> {
        self.refresh_guard.lock().await
    }

    /// Take the guard only if no refresh is running.
    pub fn try_lock_refresh(&self) -> Option<MutexGuard<'_, ()>> {
        self.refresh_guard.try_lock().ok()
    }
}
