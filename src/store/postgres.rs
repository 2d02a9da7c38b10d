use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{StatusStore, StoreError};
use crate::db::models::{Alarm, Device, SensorReading};

/// `StatusStore` backed by the service's Postgres database.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatusStore for PgStore {
    async fn devices_for_user(&self, user_id: &str) -> Result<Vec<Device>, StoreError> {
        let rows = sqlx::query_as::<_, Device>(
            r#"
            SELECT d.device_id,
                   d.user_id,
                   d.device_type,
                   d.location,
                   d.status,
                   d.last_online_time,
                   (SELECT MAX(r.reading_time)
                      FROM sensor_readings r
                     WHERE r.device_id = d.device_id) AS last_reading_time
            FROM devices d
            WHERE d.user_id = $1
            ORDER BY d.device_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn latest_alarm_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<Alarm>, StoreError> {
        let row = sqlx::query_as::<_, Alarm>(
            r#"
            SELECT alarm_id, user_id, alarm_time, alarm_label, risk_level, device_id
            FROM alarms
            WHERE user_id    = $1
              AND alarm_time >= $2
            ORDER BY alarm_time DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn latest_alarm(&self, user_id: &str) -> Result<Option<Alarm>, StoreError> {
        let row = sqlx::query_as::<_, Alarm>(
            r#"
            SELECT alarm_id, user_id, alarm_time, alarm_label, risk_level, device_id
            FROM alarms
            WHERE user_id = $1
            ORDER BY alarm_time DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn latest_readings(
        &self,
        device_ids: &[String],
    ) -> Result<Vec<SensorReading>, StoreError> {
        if device_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, SensorReading>(
            r#"
            SELECT DISTINCT ON (device_id)
                reading_id,
                device_id,
                reading_time,
                boolean_value,
                numeric_value,
                created_at
            FROM sensor_readings
            WHERE device_id = ANY($1)
            ORDER BY device_id, reading_time DESC
            "#,
        )
        .bind(device_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn recent_readings(
        &self,
        device_id: &str,
        limit: i64,
    ) -> Result<Vec<SensorReading>, StoreError> {
        let rows = sqlx::query_as::<_, SensorReading>(
            r#"
            SELECT reading_id,
                   device_id,
                   reading_time,
                   boolean_value,
                   numeric_value,
                   created_at
            FROM sensor_readings
            WHERE device_id = $1
            ORDER BY reading_time DESC
            LIMIT $2
            "#,
        )
        .bind(device_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Tests (need a live Postgres reachable through DATABASE_URL)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use sqlx::PgPool;

    use super::*;

    async fn insert_device(pool: &PgPool, device_id: &str, user_id: &str, device_type: &str) {
        sqlx::query(
            "INSERT INTO devices (device_id, user_id, device_type, last_online_time) \
             VALUES ($1, $2, $3, now())",
        )
        .bind(device_id)
        .bind(user_id)
        .bind(device_type)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn insert_reading(pool: &PgPool, device_id: &str, at: DateTime<Utc>, ppm: f64) {
        sqlx::query(
            "INSERT INTO sensor_readings (device_id, reading_time, numeric_value) \
             VALUES ($1, $2, $3)",
        )
        .bind(device_id)
        .bind(at)
        .bind(ppm)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn insert_alarm(pool: &PgPool, user_id: &str, at: DateTime<Utc>, risk_level: &str) {
        sqlx::query("INSERT INTO alarms (user_id, alarm_time, risk_level) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(at)
            .bind(risk_level)
            .execute(pool)
            .await
            .unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn devices_carry_last_reading_time(pool: PgPool) {
        let now = Utc::now();
        insert_device(&pool, "dev1", "u1", "co").await;
        insert_device(&pool, "dev2", "u1", "ir").await;
        insert_device(&pool, "dev3", "u2", "co").await;
        insert_reading(&pool, "dev1", now - Duration::seconds(20), 3.0).await;
        insert_reading(&pool, "dev1", now - Duration::seconds(10), 4.0).await;

        let store = PgStore::new(pool);
        let devices = store.devices_for_user("u1").await.unwrap();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].device_id, "dev1");
        let last = devices[0].last_reading_time.unwrap();
        assert!((last - (now - Duration::seconds(10))).num_milliseconds().abs() < 1);
        assert!(devices[1].last_reading_time.is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn latest_alarm_since_respects_window(pool: PgPool) {
        let now = Utc::now();
        insert_alarm(&pool, "u1", now - Duration::minutes(90), "danger").await;

        let store = PgStore::new(pool.clone());
        let since = now - Duration::hours(1);
        assert!(store.latest_alarm_since("u1", since).await.unwrap().is_none());
        assert!(store.latest_alarm("u1").await.unwrap().is_some());

        insert_alarm(&pool, "u1", now - Duration::minutes(30), "警告").await;
        let alarm = store.latest_alarm_since("u1", since).await.unwrap().unwrap();
        assert_eq!(alarm.risk_level, "警告");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn readings_are_newest_first(pool: PgPool) {
        let now = Utc::now();
        insert_device(&pool, "dev1", "u1", "co").await;
        insert_device(&pool, "dev2", "u1", "co2").await;
        for (secs, ppm) in [(40, 1.0), (30, 2.0), (20, 3.0), (10, 4.0)] {
            insert_reading(&pool, "dev1", now - Duration::seconds(secs), ppm).await;
        }
        insert_reading(&pool, "dev2", now, 800.0).await;

        let store = PgStore::new(pool);

        let recent = store.recent_readings("dev1", 3).await.unwrap();
        let values: Vec<_> = recent.iter().map(|r| r.numeric_value.unwrap()).collect();
        assert_eq!(values, vec![4.0, 3.0, 2.0]);

        let ids = vec!["dev1".to_owned(), "dev2".to_owned()];
        let latest = store.latest_readings(&ids).await.unwrap();
        assert_eq!(latest.len(), 2);
        let dev1 = latest.iter().find(|r| r.device_id == "dev1").unwrap();
        assert_eq!(dev1.numeric_value, Some(4.0));

        assert!(store.latest_readings(&[]).await.unwrap().is_empty());
    }
}
