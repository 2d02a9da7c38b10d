//! Device liveness: online/recent-data staleness checks and the stricter
//! reading-interval check used by the sensor status.

use chrono::{DateTime, TimeDelta, Utc};

use super::StatusWindows;
use crate::{db::models::Device, store::StoreError};

/// Number of most recent readings inspected by the interval check.
pub const READINGS_CHECKED: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Liveness {
    pub is_online: bool,
    pub has_recent_data: bool,
}

impl Liveness {
    pub fn evaluate(device: &Device, now: DateTime<Utc>, windows: &StatusWindows) -> Self {
        Self {
            is_online: within(device.last_online_time, now, windows.online),
            has_recent_data: within(device.last_reading_time, now, windows.recent_data),
        }
    }
}

fn within(at: Option<DateTime<Utc>>, now: DateTime<Utc>, window: TimeDelta) -> bool {
    at.is_some_and(|t| now - t <= window)
}

/// Outcome of the reading-interval check for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntervalVerdict {
    /// The last readings arrived at the expected cadence.
    Regular,
    /// Fewer than `READINGS_CHECKED` readings exist.
    InsufficientData { found: usize },
    /// Two consecutive readings are further apart than allowed.
    GapExceeded { gap_secs: i64 },
    /// The reading history could not be loaded.
    HistoryUnavailable,
}

impl IntervalVerdict {
    /// Check the newest readings, given newest first.
    pub fn check(times: &[DateTime<Utc>], windows: &StatusWindows) -> Self {
        if times.len() < READINGS_CHECKED {
            return Self::InsufficientData { found: times.len() };
        }

        times[..READINGS_CHECKED]
            .windows(2)
            .map(|pair| (pair[0] - pair[1]).abs())
            .find(|gap| *gap > windows.reading_gap)
            .map_or(Self::Regular, |gap| Self::GapExceeded {
                gap_secs: gap.num_seconds(),
            })
    }

    /// Fold the result of a history lookup into a verdict. A failed lookup
    /// is its own state and counts as abnormal.
    pub fn from_history(
        history: Result<Vec<DateTime<Utc>>, StoreError>,
        windows: &StatusWindows,
    ) -> Self {
        match history {
            Ok(times) => Self::check(&times, windows),
            Err(_) => Self::HistoryUnavailable,
        }
    }

    pub fn is_abnormal(&self) -> bool {
        !matches!(self, Self::Regular)
    }
}
