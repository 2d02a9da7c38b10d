use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::{
    alarm,
    liveness::{IntervalVerdict, READINGS_CHECKED},
    policy::{AlarmBasedPolicy, DeviceIntervalPolicy},
    summary::{self, DeviceList, LatestAlarm, MonitoringStatus, SensorStatus},
    EvaluatedDevice, StatusWindows,
};
use crate::{
    db::models::Device,
    store::{StatusStore, StoreError},
};

/// Runs the status pipeline for one request at a time.
///
/// Holds no mutable state; every call fetches what it needs from the store
/// and any fetch failure aborts the call. The one exception is the
/// per-device history lookup of the sensor status, which is folded into
/// `IntervalVerdict::HistoryUnavailable` instead.
#[derive(Clone)]
pub struct StatusService {
    store: Arc<dyn StatusStore>,
    windows: StatusWindows,
}

impl StatusService {
    pub fn new(store: Arc<dyn StatusStore>, windows: StatusWindows) -> Self {
        Self { store, windows }
    }

    /// Alarm-driven summary: abnormal iff an alarm was raised within the
    /// lookback window.
    pub async fn monitoring_status(&self, user_id: &str) -> Result<MonitoringStatus, StoreError> {
        let now = Utc::now();
        let since = alarm::lookback_start(now, &self.windows);

        let (devices, current_alarm) = tokio::try_join!(
            self.store.devices_for_user(user_id),
            self.store.latest_alarm_since(user_id, since),
        )?;
        let device_ids: Vec<String> = devices.iter().map(|d| d.device_id.clone()).collect();
        let latest_readings = self.store.latest_readings(&device_ids).await?;

        let verdict = AlarmBasedPolicy::evaluate(current_alarm.as_ref());
        info!(
            user_id = %user_id,
            devices = devices.len(),
            status = ?verdict.overall_status,
            level = ?verdict.alarm_level,
            "Monitoring status computed"
        );

        let devices = self.evaluate_liveness(devices, now);
        Ok(summary::monitoring(
            verdict,
            devices,
            current_alarm,
            latest_readings,
            Utc::now(),
        ))
    }

    /// Device-interval-driven summary: abnormal iff any device's recent
    /// readings are missing or too far apart.
    pub async fn sensor_status(&self, user_id: &str) -> Result<SensorStatus, StoreError> {
        let now = Utc::now();
        let devices = self.store.devices_for_user(user_id).await?;
        let verdicts = self.check_intervals(&devices).await;

        let evaluated = devices
            .into_iter()
            .zip(verdicts)
            .map(|(d, v)| EvaluatedDevice::new(d, now, &self.windows, Some(v)))
            .collect();

        let verdict = DeviceIntervalPolicy::evaluate(evaluated);
        info!(
            user_id = %user_id,
            normal = verdict.normal_devices.len(),
            abnormal = verdict.abnormal_devices.len(),
            status = ?verdict.overall_status,
            "Sensor status computed"
        );

        Ok(summary::sensor(verdict, Utc::now()))
    }

    /// Liveness of every device of `user_id`, without an overall verdict.
    pub async fn device_statuses(&self, user_id: &str) -> Result<DeviceList, StoreError> {
        let now = Utc::now();
        let devices = self.store.devices_for_user(user_id).await?;
        Ok(summary::device_list(self.evaluate_liveness(devices, now), now))
    }

    /// Newest alarm of any age, flagged relevant when it falls inside the
    /// relevance window.
    pub async fn latest_alarm(&self, user_id: &str) -> Result<LatestAlarm, StoreError> {
        let now = Utc::now();
        let latest = self.store.latest_alarm(user_id).await?;
        let is_relevant = latest
            .as_ref()
            .is_some_and(|a| alarm::is_alarm_relevant(a, now, &self.windows));
        Ok(summary::latest_alarm(latest, is_relevant, now))
    }

    fn evaluate_liveness(&self, devices: Vec<Device>, now: DateTime<Utc>) -> Vec<EvaluatedDevice> {
        devices
            .into_iter()
            .map(|d| EvaluatedDevice::new(d, now, &self.windows, None))
            .collect()
    }

    /// Looks up each device's newest readings concurrently. The result is
    /// index-aligned with `devices`; a lookup that errors or whose task
    /// dies yields `HistoryUnavailable`.
    async fn check_intervals(&self, devices: &[Device]) -> Vec<IntervalVerdict> {
        let mut lookups = JoinSet::new();
        for (idx, device) in devices.iter().enumerate() {
            let store = Arc::clone(&self.store);
            let device_id = device.device_id.clone();
            lookups.spawn(async move {
                let history = store
                    .recent_readings(&device_id, READINGS_CHECKED as i64)
                    .await
                    .map(|rows| rows.into_iter().map(|r| r.reading_time).collect::<Vec<_>>());
                if let Err(e) = &history {
                    warn!(
                        device_id = %device_id,
                        error = %e,
                        "Reading history unavailable; marking device abnormal"
                    );
                }
                (idx, history)
            });
        }

        let mut verdicts = vec![IntervalVerdict::HistoryUnavailable; devices.len()];
        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((idx, history)) => {
                    verdicts[idx] = IntervalVerdict::from_history(history, &self.windows);
                    debug!(
                        device_id = %devices[idx].device_id,
                        verdict = ?verdicts[idx],
                        "Interval checked"
                    );
                }
                Err(e) => warn!(error = %e, "Reading history lookup task failed"),
            }
        }
        verdicts
    }
}
