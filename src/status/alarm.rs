//! Alarm classification.
//!
//! Two recency windows exist and are deliberately kept apart:
//! `StatusWindows::alarm_lookback` selects the alarm that drives the
//! monitoring status, while `StatusWindows::alarm_relevance` answers the
//! looser "is the user's latest alarm still relevant" question.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::StatusWindows;
use crate::db::models::Alarm;

/// Alarm severity, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlarmLevel {
    #[default]
    Normal,
    Warning,
    Severe,
    Danger,
}

impl AlarmLevel {
    /// Map an upstream `risk_level` string to a level. Matching is
    /// case-insensitive for the English labels; unrecognised values are
    /// `Normal`.
    pub fn from_risk_level(risk_level: &str) -> Self {
        match risk_level.trim().to_lowercase().as_str() {
            "warning" | "警告" => Self::Warning,
            "severe" | "嚴重" => Self::Severe,
            "danger" | "危險" => Self::Danger,
            _ => Self::Normal,
        }
    }

    /// Level of the alarm selected for a summary; no alarm means `Normal`.
    pub fn classify(alarm: Option<&Alarm>) -> Self {
        alarm.map_or(Self::Normal, |a| Self::from_risk_level(&a.risk_level))
    }
}

/// Start of the lookback window used to select the current alarm.
pub fn lookback_start(now: DateTime<Utc>, windows: &StatusWindows) -> DateTime<Utc> {
    now - windows.alarm_lookback
}

/// Whether `alarm` is recent enough to still be shown as relevant.
pub fn is_alarm_relevant(alarm: &Alarm, now: DateTime<Utc>, windows: &StatusWindows) -> bool {
    now - alarm.alarm_time <= windows.alarm_relevance
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;

    fn alarm(risk_level: &str, age: Duration) -> Alarm {
        Alarm {
            alarm_id: Uuid::new_v4(),
            user_id: "u1".to_owned(),
            alarm_time: Utc::now() - age,
            alarm_label: None,
            risk_level: risk_level.to_owned(),
            device_id: None,
        }
    }

    #[test]
    fn levels_are_ordered() {
        assert!(AlarmLevel::Normal < AlarmLevel::Warning);
        assert!(AlarmLevel::Warning < AlarmLevel::Severe);
        assert!(AlarmLevel::Severe < AlarmLevel::Danger);
    }

    #[test]
    fn english_risk_levels_are_case_insensitive() {
        assert_eq!(AlarmLevel::from_risk_level("Warning"), AlarmLevel::Warning);
        assert_eq!(AlarmLevel::from_risk_level("SEVERE"), AlarmLevel::Severe);
        assert_eq!(AlarmLevel::from_risk_level("danger"), AlarmLevel::Danger);
    }

    #[test]
    fn chinese_risk_levels() {
        assert_eq!(AlarmLevel::from_risk_level("警告"), AlarmLevel::Warning);
        assert_eq!(AlarmLevel::from_risk_level("嚴重"), AlarmLevel::Severe);
        assert_eq!(AlarmLevel::from_risk_level("危險"), AlarmLevel::Danger);
    }

    #[test]
    fn unknown_or_missing_alarm_is_normal() {
        assert_eq!(AlarmLevel::from_risk_level("critical"), AlarmLevel::Normal);
        assert_eq!(AlarmLevel::from_risk_level(""), AlarmLevel::Normal);
        assert_eq!(AlarmLevel::classify(None), AlarmLevel::Normal);
    }

    #[test]
    fn classify_uses_risk_level() {
        let a = alarm("危險", Duration::minutes(5));
        assert_eq!(AlarmLevel::classify(Some(&a)), AlarmLevel::Danger);
    }

    #[test]
    fn serializes_uppercase() {
        let json = serde_json::to_string(&AlarmLevel::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
    }

    #[test]
    fn relevance_uses_the_day_window() {
        let windows = StatusWindows::default();
        let now = Utc::now();
        assert!(is_alarm_relevant(&alarm("warning", Duration::hours(23)), now, &windows));
        assert!(!is_alarm_relevant(&alarm("warning", Duration::hours(25)), now, &windows));
    }

    #[test]
    fn lookback_and_relevance_differ() {
        let windows = StatusWindows::default();
        let now = Utc::now();
        let two_hours_old = alarm("warning", Duration::hours(2));
        assert!(two_hours_old.alarm_time < lookback_start(now, &windows));
        assert!(is_alarm_relevant(&two_hours_old, now, &windows));
    }
}
