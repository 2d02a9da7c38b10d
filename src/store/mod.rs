//! Read-only access to the rows the status pipeline consumes.
//!
//! Handlers never talk to the database directly; they receive a
//! `StatusStore` through `AppState`, so the pipeline can run against
//! Postgres in production and against `MemoryStore` in tests.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::models::{Alarm, Device, SensorReading};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait StatusStore: Send + Sync {
    /// All devices owned by `user_id`, with `last_reading_time` filled in.
    async fn devices_for_user(&self, user_id: &str) -> Result<Vec<Device>, StoreError>;

    /// Most recent alarm for `user_id` raised at or after `since`.
    async fn latest_alarm_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<Alarm>, StoreError>;

    /// Most recent alarm for `user_id`, regardless of age.
    async fn latest_alarm(&self, user_id: &str) -> Result<Option<Alarm>, StoreError>;

    /// Newest reading of each device in `device_ids`. Devices without any
    /// reading are simply absent from the result.
    async fn latest_readings(&self, device_ids: &[String])
        -> Result<Vec<SensorReading>, StoreError>;

    /// Up to `limit` readings of `device_id`, newest first.
    async fn recent_readings(
        &self,
        device_id: &str,
        limit: i64,
    ) -> Result<Vec<SensorReading>, StoreError>;
}
