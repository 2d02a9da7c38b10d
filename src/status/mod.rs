//! Caregiver status pipeline.
//!
//! Raw device, reading and alarm rows go in; one of two summaries comes
//! out. `liveness` and `alarm` judge the inputs independently, `policy`
//! turns their verdicts into an overall status, and `summary` packages the
//! result for the client. `service` wires the pipeline to a `StatusStore`.

pub mod alarm;
pub mod liveness;
pub mod policy;
pub mod service;
pub mod summary;
pub mod thresholds;

use chrono::{DateTime, TimeDelta, Utc};

use crate::db::models::Device;
use liveness::{IntervalVerdict, Liveness};

pub use service::StatusService;

/// Time windows used by the status checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusWindows {
    /// Max age of `last_online_time` for a device to count as online.
    pub online: TimeDelta,
    /// Max age of the newest reading for a device to have recent data.
    pub recent_data: TimeDelta,
    /// Max spacing between consecutive readings in the interval check.
    pub reading_gap: TimeDelta,
    /// How far back the monitoring status looks for an alarm.
    pub alarm_lookback: TimeDelta,
    /// How old an alarm may be and still be reported as relevant.
    pub alarm_relevance: TimeDelta,
}

impl Default for StatusWindows {
    fn default() -> Self {
        Self {
            online: TimeDelta::minutes(5),
            recent_data: TimeDelta::minutes(10),
            reading_gap: TimeDelta::seconds(30),
            alarm_lookback: TimeDelta::hours(1),
            alarm_relevance: TimeDelta::hours(24),
        }
    }
}

/// A device together with everything the pipeline concluded about it.
/// `interval` is only computed on the sensor-status path.
#[derive(Debug, Clone)]
pub struct EvaluatedDevice {
    pub device: Device,
    pub liveness: Liveness,
    pub interval: Option<IntervalVerdict>,
}

impl EvaluatedDevice {
    pub fn new(
        device: Device,
        now: DateTime<Utc>,
        windows: &StatusWindows,
        interval: Option<IntervalVerdict>,
    ) -> Self {
        let liveness = Liveness::evaluate(&device, now, windows);
        Self {
            device,
            liveness,
            interval,
        }
    }

    pub fn is_abnormal(&self) -> bool {
        self.interval.as_ref().is_some_and(IntervalVerdict::is_abnormal)
    }
}
