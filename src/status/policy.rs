//! The two overall-status policies.
//!
//! The monitoring status is driven only by alarms and the sensor status
//! only by device reading intervals. They are kept as separate policies
//! instead of being merged into a single rule.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{alarm::AlarmLevel, EvaluatedDevice};
use crate::db::models::{Alarm, DeviceType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    #[default]
    Normal,
    Abnormal,
}

impl OverallStatus {
    fn from_abnormal(abnormal: bool) -> Self {
        if abnormal {
            Self::Abnormal
        } else {
            Self::Normal
        }
    }
}

// ---------------------------------------------------------------------------
// AlarmBasedPolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmVerdict {
    pub overall_status: OverallStatus,
    pub alarm_level: AlarmLevel,
    pub messages: Vec<String>,
}

/// Abnormal iff an alarm was found inside the lookback window. Device
/// liveness is not consulted.
pub struct AlarmBasedPolicy;

impl AlarmBasedPolicy {
    pub fn evaluate(current_alarm: Option<&Alarm>) -> AlarmVerdict {
        let messages = current_alarm
            .map(|a| {
                let source = a
                    .alarm_label
                    .as_deref()
                    .or(a.device_id.as_deref())
                    .unwrap_or("警報");
                vec![format!("{source}：{}", a.risk_level)]
            })
            .unwrap_or_default();

        AlarmVerdict {
            overall_status: OverallStatus::from_abnormal(current_alarm.is_some()),
            alarm_level: AlarmLevel::classify(current_alarm),
            messages,
        }
    }
}

// ---------------------------------------------------------------------------
// DeviceIntervalPolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DeviceVerdict {
    pub overall_status: OverallStatus,
    pub normal_devices: Vec<EvaluatedDevice>,
    pub abnormal_devices: Vec<EvaluatedDevice>,
    pub messages: Vec<String>,
}

/// Abnormal iff at least one device failed the reading-interval check.
/// Alarms are not consulted.
pub struct DeviceIntervalPolicy;

impl DeviceIntervalPolicy {
    pub fn evaluate(devices: Vec<EvaluatedDevice>) -> DeviceVerdict {
        let (abnormal_devices, normal_devices): (Vec<_>, Vec<_>) =
            devices.into_iter().partition(EvaluatedDevice::is_abnormal);

        DeviceVerdict {
            overall_status: OverallStatus::from_abnormal(!abnormal_devices.is_empty()),
            messages: abnormal_messages(&abnormal_devices),
            normal_devices,
            abnormal_devices,
        }
    }
}

/// One message per abnormal device type, in order of first appearance.
fn abnormal_messages(abnormal: &[EvaluatedDevice]) -> Vec<String> {
    let mut counts: Vec<(DeviceType, usize)> = Vec::new();
    for d in abnormal {
        let kind = d.device.kind();
        match counts.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, n)) => *n += 1,
            None => counts.push((kind, 1)),
        }
    }

    counts
        .into_iter()
        .map(|(kind, n)| format!("{}有 {n} 個設備異常", kind.display_name()))
        .collect()
}
