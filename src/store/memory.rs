use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{StatusStore, StoreError};
use crate::db::models::{Alarm, Device, SensorReading};

#[derive(Default)]
struct Tables {
    devices: Vec<Device>,
    readings: Vec<SensorReading>,
    alarms: Vec<Alarm>,
    /// Devices whose history lookup should fail.
    broken_history: HashSet<String>,
}

/// In-memory `StatusStore` used by tests and local demos.
///
/// `last_reading_time` is derived from the stored readings on every
/// `devices_for_user` call, the same way `PgStore` derives it in SQL.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_device(&self, device: Device) {
        self.inner.write().await.devices.push(device);
    }

    pub async fn insert_reading(&self, reading: SensorReading) {
        self.inner.write().await.readings.push(reading);
    }

    pub async fn insert_alarm(&self, alarm: Alarm) {
        self.inner.write().await.alarms.push(alarm);
    }

    /// Make `recent_readings` fail for `device_id`.
    pub async fn break_history(&self, device_id: &str) {
        self.inner
            .write()
            .await
            .broken_history
            .insert(device_id.to_owned());
    }
}

#[async_trait]
impl StatusStore for MemoryStore {
    async fn devices_for_user(&self, user_id: &str) -> Result<Vec<Device>, StoreError> {
        let tables = self.inner.read().await;
        let mut devices: Vec<Device> = tables
            .devices
            .iter()
            .filter(|d| d.user_id == user_id)
            .map(|d| {
                let last_reading_time = tables
                    .readings
                    .iter()
                    .filter(|r| r.device_id == d.device_id)
                    .map(|r| r.reading_time)
                    .max();
                Device {
                    last_reading_time,
                    ..d.clone()
                }
            })
            .collect();
        devices.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        Ok(devices)
    }

    async fn latest_alarm_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<Alarm>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables
            .alarms
            .iter()
            .filter(|a| a.user_id == user_id && a.alarm_time >= since)
            .max_by_key(|a| a.alarm_time)
            .cloned())
    }

    async fn latest_alarm(&self, user_id: &str) -> Result<Option<Alarm>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables
            .alarms
            .iter()
            .filter(|a| a.user_id == user_id)
            .max_by_key(|a| a.alarm_time)
            .cloned())
    }

    async fn latest_readings(
        &self,
        device_ids: &[String],
    ) -> Result<Vec<SensorReading>, StoreError> {
        let tables = self.inner.read().await;
        Ok(device_ids
            .iter()
            .filter_map(|id| {
                tables
                    .readings
                    .iter()
                    .filter(|r| &r.device_id == id)
                    .max_by_key(|r| r.reading_time)
                    .cloned()
            })
            .collect())
    }

    async fn recent_readings(
        &self,
        device_id: &str,
        limit: i64,
    ) -> Result<Vec<SensorReading>, StoreError> {
        let tables = self.inner.read().await;
        if tables.broken_history.contains(device_id) {
            return Err(StoreError::Unavailable(format!(
                "history for {device_id} is unavailable"
            )));
        }

        let mut rows: Vec<SensorReading> = tables
            .readings
            .iter()
            .filter(|r| r.device_id == device_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.reading_time.cmp(&a.reading_time));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }
}
