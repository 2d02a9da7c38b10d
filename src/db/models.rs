use std::{convert::Infallible, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// DeviceType
// ---------------------------------------------------------------------------

/// Sensor categories known to the caregiver app.
///
/// Devices are provisioned outside this service, so any other type string
/// is kept verbatim in `Other` and shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceType {
    /// Carbon monoxide detector, numeric ppm readings.
    Co,
    /// Carbon dioxide detector, numeric ppm readings.
    Co2,
    /// Infrared motion sensor, boolean readings.
    Ir,
    Other(String),
}

impl DeviceType {
    /// Name shown to the caregiver in status messages.
    pub fn display_name(&self) -> &str {
        match self {
            DeviceType::Co => "一氧化碳感測器",
            DeviceType::Co2 => "二氧化碳感測器",
            DeviceType::Ir => "紅外線感測器",
            DeviceType::Other(raw) => raw,
        }
    }
}

impl From<&str> for DeviceType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "co" => Self::Co,
            "co2" => Self::Co2,
            "ir" => Self::Ir,
            _ => Self::Other(s.to_owned()),
        }
    }
}

impl FromStr for DeviceType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceType::Co => "co",
            DeviceType::Co2 => "co2",
            DeviceType::Ir => "ir",
            DeviceType::Other(raw) => raw,
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A provisioned sensor unit. `last_reading_time` is derived by the store
/// from the newest row in `sensor_readings`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Device {
    pub device_id: String,
    pub user_id: String,
    pub device_type: String,
    pub location: String,
    pub status: String,
    pub last_online_time: Option<DateTime<Utc>>,
    pub last_reading_time: Option<DateTime<Utc>>,
}

impl Device {
    pub fn kind(&self) -> DeviceType {
        self.device_type.as_str().into()
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SensorReading {
    pub reading_id: Uuid,
    pub device_id: String,
    pub reading_time: DateTime<Utc>,
    /// Motion-type sensors.
    pub boolean_value: Option<bool>,
    /// Gas concentration in ppm.
    pub numeric_value: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Alarm {
    pub alarm_id: Uuid,
    pub user_id: String,
    pub alarm_time: DateTime<Utc>,
    pub alarm_label: Option<String>,
    /// Free-text severity as written upstream, e.g. `"warning"` or `"警告"`.
    pub risk_level: String,
    pub device_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_known_values() {
        assert_eq!("co".parse::<DeviceType>().unwrap(), DeviceType::Co);
        assert_eq!("CO2".parse::<DeviceType>().unwrap(), DeviceType::Co2);
        assert_eq!(" ir ".parse::<DeviceType>().unwrap(), DeviceType::Ir);
    }

    #[test]
    fn unknown_device_type_passes_through() {
        let kind: DeviceType = "smoke".parse().unwrap();
        assert_eq!(kind, DeviceType::Other("smoke".to_owned()));
        assert_eq!(kind.display_name(), "smoke");
        assert_eq!(kind.to_string(), "smoke");
    }

    #[test]
    fn display_roundtrip_for_known_types() {
        for kind in [DeviceType::Co, DeviceType::Co2, DeviceType::Ir] {
            assert_eq!(kind.to_string().parse::<DeviceType>().unwrap(), kind);
        }
    }
}
