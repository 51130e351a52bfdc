//! Sensor health from the last accepted reading.

use chrono::{DateTime, Utc};
use jal_domain::config::SensorHealthConfig;
use jal_domain::{SensorId, SensorReading};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorStatus {
    Healthy,
    Warning,
    Critical,
    LowBattery,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorHealth {
    pub sensor_id: SensorId,
    pub status: SensorStatus,
    pub last_seen: Option<DateTime<Utc>>,
    pub minutes_since_seen: Option<i64>,
    pub pressure: Option<f64>,
    pub battery: Option<f64>,
}

/// Checks run in order: silence first, then battery, then pressure.
///
/// Pressure limits are the classifier's critical and low thresholds.
#[must_use]
pub fn assess(
    sensor_id: SensorId,
    last: Option<&SensorReading>,
    now: DateTime<Utc>,
    limits: &SensorHealthConfig,
    critical_pressure: f64,
    low_pressure: f64,
) -> SensorHealth {
    let Some(reading) = last else {
        return SensorHealth {
            sensor_id,
            status: SensorStatus::Offline,
            last_seen: None,
            minutes_since_seen: None,
            pressure: None,
            battery: None,
        };
    };

    let minutes = (now - reading.timestamp).num_minutes();
    let status = if minutes > limits.offline_after_minutes {
        SensorStatus::Offline
    } else if minutes > limits.stale_after_minutes {
        SensorStatus::Warning
    } else if reading.battery.is_some_and(|b| b < limits.low_battery) {
        SensorStatus::LowBattery
    } else if reading.pressure < critical_pressure {
        SensorStatus::Critical
    } else if reading.pressure < low_pressure {
        SensorStatus::Warning
    } else {
        SensorStatus::Healthy
    };

    SensorHealth {
        sensor_id,
        status,
        last_seen: Some(reading.timestamp),
        minutes_since_seen: Some(minutes),
        pressure: Some(reading.pressure),
        battery: reading.battery,
    }
}
