//! Response objects returned to the mobile client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    alarm::AlarmLevel,
    policy::{AlarmVerdict, DeviceVerdict, OverallStatus},
    thresholds, EvaluatedDevice,
};
use crate::db::models::{Alarm, DeviceType, SensorReading};

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatusDto {
    pub device_id: String,
    /// Raw type string as provisioned, e.g. `co`.
    pub device_type: String,
    /// Localised type name; unknown types repeat `device_type`.
    pub device_type_name: String,
    pub location: String,
    pub status: String,
    pub last_online_time: Option<DateTime<Utc>>,
    pub is_online: bool,
    pub last_reading_time: Option<DateTime<Utc>>,
    pub has_recent_data: bool,
    /// Only present on the sensor status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_abnormal: Option<bool>,
}

impl From<EvaluatedDevice> for DeviceStatusDto {
    fn from(d: EvaluatedDevice) -> Self {
        let is_abnormal = d.interval.as_ref().map(|v| v.is_abnormal());
        let device_type_name = d.device.kind().display_name().to_owned();
        Self {
            device_id: d.device.device_id,
            device_type: d.device.device_type,
            device_type_name,
            location: d.device.location,
            status: d.device.status,
            last_online_time: d.device.last_online_time,
            is_online: d.liveness.is_online,
            last_reading_time: d.device.last_reading_time,
            has_recent_data: d.liveness.has_recent_data,
            is_abnormal,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SensorReadingDto {
    pub reading_id: Uuid,
    pub device_id: String,
    pub reading_time: DateTime<Utc>,
    pub boolean_value: Option<bool>,
    /// ppm
    pub numeric_value: Option<f64>,
    pub created_at: DateTime<Utc>,
    /// Concentration band of `numeric_value` for gas sensors.
    pub level: Option<AlarmLevel>,
}

impl SensorReadingDto {
    fn new(reading: SensorReading, device_type: Option<&DeviceType>) -> Self {
        let level = device_type.and_then(|kind| thresholds::classify_reading(kind, &reading));
        Self {
            reading_id: reading.reading_id,
            device_id: reading.device_id,
            reading_time: reading.reading_time,
            boolean_value: reading.boolean_value,
            numeric_value: reading.numeric_value,
            created_at: reading.created_at,
            level,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlarmDto {
    pub alarm_id: Uuid,
    pub user_id: String,
    pub alarm_time: DateTime<Utc>,
    pub alarm_label: Option<String>,
    pub risk_level: String,
    pub level: AlarmLevel,
    pub device_id: Option<String>,
}

impl From<Alarm> for AlarmDto {
    fn from(a: Alarm) -> Self {
        let level = AlarmLevel::from_risk_level(&a.risk_level);
        Self {
            alarm_id: a.alarm_id,
            user_id: a.user_id,
            alarm_time: a.alarm_time,
            alarm_label: a.alarm_label,
            risk_level: a.risk_level,
            level,
            device_id: a.device_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Alarm-driven summary for the caregiver's home screen.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringStatus {
    pub overall_status: OverallStatus,
    pub alarm_level: AlarmLevel,
    pub device_statuses: Vec<DeviceStatusDto>,
    pub latest_alarm: Option<AlarmDto>,
    pub latest_sensor_readings: Vec<SensorReadingDto>,
    pub error_messages: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

/// Device-interval-driven summary for the sensor screen.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SensorStatus {
    pub overall_status: OverallStatus,
    pub normal_devices: Vec<DeviceStatusDto>,
    pub abnormal_devices: Vec<DeviceStatusDto>,
    pub error_messages: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

/// Liveness-only view of a user's devices.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceList {
    pub devices: Vec<DeviceStatusDto>,
    pub last_updated: DateTime<Utc>,
}

/// Newest alarm of any age, with the 24-hour relevance flag.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LatestAlarm {
    pub alarm: Option<AlarmDto>,
    pub is_relevant: bool,
    pub last_updated: DateTime<Utc>,
}

pub fn monitoring(
    verdict: AlarmVerdict,
    devices: Vec<EvaluatedDevice>,
    current_alarm: Option<Alarm>,
    latest_readings: Vec<SensorReading>,
    computed_at: DateTime<Utc>,
) -> MonitoringStatus {
    let latest_sensor_readings = latest_readings
        .into_iter()
        .map(|r| {
            let kind = devices
                .iter()
                .find(|d| d.device.device_id == r.device_id)
                .map(|d| d.device.kind());
            SensorReadingDto::new(r, kind.as_ref())
        })
        .collect();

    MonitoringStatus {
        overall_status: verdict.overall_status,
        alarm_level: verdict.alarm_level,
        device_statuses: devices.into_iter().map(Into::into).collect(),
        latest_alarm: current_alarm.map(Into::into),
        latest_sensor_readings,
        error_messages: verdict.messages,
        last_updated: computed_at,
    }
}

pub fn sensor(verdict: DeviceVerdict, computed_at: DateTime<Utc>) -> SensorStatus {
    SensorStatus {
        overall_status: verdict.overall_status,
        normal_devices: verdict.normal_devices.into_iter().map(Into::into).collect(),
        abnormal_devices: verdict.abnormal_devices.into_iter().map(Into::into).collect(),
        error_messages: verdict.messages,
        last_updated: computed_at,
    }
}

pub fn latest_alarm(
    alarm: Option<Alarm>,
    is_relevant: bool,
    computed_at: DateTime<Utc>,
) -> LatestAlarm {
    LatestAlarm {
        alarm: alarm.map(Into::into),
        is_relevant,
        last_updated: computed_at,
    }
}

pub fn device_list(devices: Vec<EvaluatedDevice>, computed_at: DateTime<Utc>) -> DeviceList {
    DeviceList {
        devices: devices.into_iter().map(Into::into).collect(),
        last_updated: computed_at,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::{
        db::models::Device,
        status::{
            liveness::IntervalVerdict,
            policy::{AlarmBasedPolicy, DeviceIntervalPolicy},
            StatusWindows,
        },
    };

    fn device(device_id: &str, device_type: &str, now: DateTime<Utc>) -> Device {
        Device {
            device_id: device_id.to_owned(),
            user_id: "u1".to_owned(),
            device_type: device_type.to_owned(),
            location: "kitchen".to_owned(),
            status: "installed".to_owned(),
            last_online_time: Some(now - Duration::minutes(1)),
            last_reading_time: Some(now - Duration::minutes(20)),
        }
    }

    fn reading(device_id: &str, ppm: f64, at: DateTime<Utc>) -> SensorReading {
        SensorReading {
            reading_id: Uuid::new_v4(),
            device_id: device_id.to_owned(),
            reading_time: at,
            boolean_value: None,
            numeric_value: Some(ppm),
            created_at: at,
        }
    }

    #[test]
    fn monitoring_summary_is_camel_case_and_hides_interval_flag() {
        let now = Utc::now();
        let w = StatusWindows::default();
        let devices = vec![EvaluatedDevice::new(device("dev1", "co", now), now, &w, None)];
        let verdict = AlarmBasedPolicy::evaluate(None);

        let summary = monitoring(verdict, devices, None, vec![reading("dev1", 40.0, now)], now);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["overallStatus"], "normal");
        assert_eq!(json["alarmLevel"], "NORMAL");
        assert!(json["latestAlarm"].is_null());
        assert_eq!(json["errorMessages"], serde_json::json!([]));

        let d = &json["deviceStatuses"][0];
        assert_eq!(d["deviceId"], "dev1");
        assert_eq!(d["deviceTypeName"], "一氧化碳感測器");
        assert_eq!(d["isOnline"], true);
        assert_eq!(d["hasRecentData"], false);
        assert!(d.get("isAbnormal").is_none());

        let r = &json["latestSensorReadings"][0];
        assert_eq!(r["numericValue"], 40.0);
        assert_eq!(r["level"], "SEVERE");
    }

    #[test]
    fn last_updated_is_computation_time() {
        let now = Utc::now();
        let computed_at = now + Duration::seconds(3);
        let summary = monitoring(
            AlarmBasedPolicy::evaluate(None),
            Vec::new(),
            None,
            vec![reading("dev1", 1.0, now - Duration::days(2))],
            computed_at,
        );
        assert_eq!(summary.last_updated, computed_at);
    }

    #[test]
    fn sensor_summary_partitions_devices() {
        let now = Utc::now();
        let w = StatusWindows::default();
        let verdict = DeviceIntervalPolicy::evaluate(vec![
            EvaluatedDevice::new(device("a", "co", now), now, &w, Some(IntervalVerdict::Regular)),
            EvaluatedDevice::new(
                device("b", "co2", now),
                now,
                &w,
                Some(IntervalVerdict::InsufficientData { found: 1 }),
            ),
        ]);

        let summary = sensor(verdict, now);
        assert_eq!(summary.overall_status, OverallStatus::Abnormal);
        assert_eq!(summary.normal_devices.len(), 1);
        assert_eq!(summary.normal_devices[0].is_abnormal, Some(false));
        assert_eq!(summary.abnormal_devices[0].device_id, "b");
        assert_eq!(summary.abnormal_devices[0].is_abnormal, Some(true));
        assert_eq!(summary.error_messages, vec!["二氧化碳感測器有 1 個設備異常".to_owned()]);
    }
}
