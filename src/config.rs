use anyhow::{bail, Context, Result};
use chrono::TimeDelta;

use crate::status::StatusWindows;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub db_max_connections: u32,
    pub windows: StatusWindows,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            db_max_connections: optional("DB_MAX_CONNECTIONS", "10")
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            windows: windows_from_env()?,
        })
    }
}

/// Status windows with per-variable overrides, all in seconds.
fn windows_from_env() -> Result<StatusWindows> {
    let defaults = StatusWindows::default();
    Ok(StatusWindows {
        online: window("ONLINE_WINDOW_SECS", defaults.online)?,
        recent_data: window("RECENT_DATA_WINDOW_SECS", defaults.recent_data)?,
        reading_gap: window("READING_GAP_SECS", defaults.reading_gap)?,
        alarm_lookback: window("ALARM_LOOKBACK_SECS", defaults.alarm_lookback)?,
        alarm_relevance: window("ALARM_RELEVANCE_SECS", defaults.alarm_relevance)?,
    })
}

fn window(key: &str, default: TimeDelta) -> Result<TimeDelta> {
    match std::env::var(key) {
        Ok(raw) => parse_window(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_window(key: &str, raw: &str) -> Result<TimeDelta> {
    let secs: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a whole number of seconds, got: {raw:?}"))?;
    if secs <= 0 {
        bail!("{key} must be positive, got: {secs}");
    }
    TimeDelta::try_seconds(secs).with_context(|| format!("{key} is out of range: {secs}"))
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("missing required env var: {key}"))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_window_accepts_seconds() {
        let w = parse_window("READING_GAP_SECS", " 45 ").unwrap();
        assert_eq!(w, TimeDelta::seconds(45));
    }

    #[test]
    fn parse_window_rejects_zero_and_negative() {
        for raw in ["0", "-5"] {
            let err = parse_window("ONLINE_WINDOW_SECS", raw).unwrap_err();
            assert!(err.to_string().contains("must be positive"));
        }
    }

    #[test]
    fn parse_window_rejects_garbage() {
        let err = parse_window("ALARM_LOOKBACK_SECS", "1h").unwrap_err();
        assert!(err.to_string().contains("ALARM_LOOKBACK_SECS"));
    }

    #[test]
    fn unset_window_uses_default() {
        let w = window("ANGLE_CARING_TEST_UNSET_WINDOW", TimeDelta::minutes(7)).unwrap();
        assert_eq!(w, TimeDelta::minutes(7));
    }

    #[test]
    fn default_windows() {
        let w = StatusWindows::default();
        assert_eq!(w.online, TimeDelta::seconds(300));
        assert_eq!(w.recent_data, TimeDelta::seconds(600));
        assert_eq!(w.reading_gap, TimeDelta::seconds(30));
        assert_eq!(w.alarm_lookback, TimeDelta::seconds(3600));
        assert_eq!(w.alarm_relevance, TimeDelta::seconds(86400));
    }
}
