//! Concentration bands for gas sensors.

use super::alarm::AlarmLevel;
use crate::db::models::{DeviceType, SensorReading};

/// Lower bounds (ppm) at which a reading enters each level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasBands {
    pub warning: f64,
    pub severe: f64,
    pub danger: f64,
}

impl GasBands {
    pub const CO: GasBands = GasBands {
        warning: 9.0,
        severe: 35.0,
        danger: 100.0,
    };

    pub const CO2: GasBands = GasBands {
        warning: 1000.0,
        severe: 2000.0,
        danger: 5000.0,
    };

    pub fn for_device_type(device_type: &DeviceType) -> Option<GasBands> {
        match device_type {
            DeviceType::Co => Some(Self::CO),
            DeviceType::Co2 => Some(Self::CO2),
            DeviceType::Ir | DeviceType::Other(_) => None,
        }
    }

    pub fn evaluate(&self, ppm: f64) -> AlarmLevel {
        if ppm >= self.danger {
            AlarmLevel::Danger
        } else if ppm >= self.severe {
            AlarmLevel::Severe
        } else if ppm >= self.warning {
            AlarmLevel::Warning
        } else {
            AlarmLevel::Normal
        }
    }
}

/// Severity of a single reading, or `None` when the device type has no
/// bands or the reading carries no numeric value.
pub fn classify_reading(device_type: &DeviceType, reading: &SensorReading) -> Option<AlarmLevel> {
    let bands = GasBands::for_device_type(device_type)?;
    reading.numeric_value.map(|ppm| bands.evaluate(ppm))
}
