//! Validation of readings as they arrive from the telemetry transport.

use crate::TelemetryError;
use chrono::{DateTime, Utc};
use jal_domain::{SensorId, SensorReading};
use serde::Deserialize;

/// How far a device clock may run ahead of the receive time.
const MAX_CLOCK_SKEW_SECONDS: i64 = 300;

/// A measurement as sent by the device: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Measurement {
    Number(f64),
    Text(String),
}

impl Measurement {
    fn value(&self) -> Option<f64> {
        let value = match self {
            Self::Number(v) => *v,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for Measurement {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Unvalidated sensor sample.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawReading {
    pub sensor_id: SensorId,
    #[serde(default)]
    pub pressure: Option<Measurement>,
    #[serde(default)]
    pub flow: Option<Measurement>,
    #[serde(default)]
    pub ph: Option<Measurement>,
    #[serde(default)]
    pub turbidity: Option<Measurement>,
    #[serde(default)]
    pub battery: Option<Measurement>,
    /// Device time. Falls back to the receive time when absent.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawReading {
    /// Numeric reading with every optional field absent.
    pub fn new(sensor_id: impl Into<SensorId>, pressure: f64, flow: f64) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            pressure: Some(pressure.into()),
            flow: Some(flow.into()),
            ph: None,
            turbidity: None,
            battery: None,
            timestamp: None,
        }
    }

    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    #[must_use]
    pub fn with_battery(mut self, battery: f64) -> Self {
        self.battery = Some(battery.into());
        self
    }

    /// Checks pressure and flow and fills in the timestamp.
    ///
    /// Secondary measurements (ph, turbidity, battery) that fail to parse
    /// are dropped rather than rejecting the reading.
    ///
    /// # Errors
    /// Returns [`TelemetryError::MalformedReading`] when pressure or flow is
    /// missing, non-numeric or non-finite, or when the device timestamp is
    /// more than five minutes ahead of `received_at`.
    pub fn validate(self, received_at: DateTime<Utc>) -> Result<SensorReading, TelemetryError> {
        let pressure = required(&self.sensor_id, "pressure", self.pressure.as_ref())?;
        let flow = required(&self.sensor_id, "flow", self.flow.as_ref())?;

        if let Some(sent) = self.timestamp
            && (sent - received_at).num_seconds() > MAX_CLOCK_SKEW_SECONDS
        {
            return Err(TelemetryError::MalformedReading {
                message: format!("timestamp {sent} is ahead of receive time {received_at}").into(),
                context: Some(format!("sensor {}", self.sensor_id).into()),
            });
        }

        Ok(SensorReading {
            pressure,
            flow,
            ph: self.ph.as_ref().and_then(Measurement::value),
            turbidity: self.turbidity.as_ref().and_then(Measurement::value),
            battery: self.battery.as_ref().and_then(Measurement::value),
            timestamp: self.timestamp.unwrap_or(received_at),
            sensor_id: self.sensor_id,
        })
    }
}

fn required(
    sensor: &SensorId,
    field: &'static str,
    measurement: Option<&Measurement>,
) -> Result<f64, TelemetryError> {
    let Some(measurement) = measurement else {
        return Err(TelemetryError::MalformedReading {
            message: format!("{field} is missing").into(),
            context: Some(format!("sensor {sensor}").into()),
        });
    };
    measurement.value().ok_or_else(|| TelemetryError::MalformedReading {
        message: format!("{field} is not a finite number: {measurement:?}").into(),
        context: Some(format!("sensor {sensor}").into()),
    })
}
