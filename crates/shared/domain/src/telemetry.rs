use crate::ids::{LeakEventId, SensorId, WardId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A validated sensor sample. Pressure is in bar, flow in litres per minute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: SensorId,
    pub pressure: f64,
    pub flow: f64,
    pub ph: Option<f64>,
    pub turbidity: Option<f64>,
    pub battery: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyType {
    CriticalLowPressure,
    LowPressure,
    PressureSpike,
    LowFlow,
    HighFlow,
    Normal,
}

impl AnomalyType {
    /// Fixed field guidance for each anomaly type.
    #[must_use]
    pub const fn recommended_action(self) -> &'static str {
        match self {
            Self::CriticalLowPressure => {
                "Immediate inspection required. Possible major leak or valve failure."
            },
            Self::LowPressure => "Schedule inspection. Check for leaks or valve issues.",
            Self::PressureSpike => "Monitor closely. Could indicate valve operation or pump issue.",
            Self::LowFlow => "Check for blockages or meter issues.",
            Self::HighFlow => "Verify meter reading. Possible leak downstream.",
            Self::Normal => "No action required.",
        }
    }
}

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    None,
    Medium,
    High,
    Critical,
}

/// Outcome of classifying one reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub anomaly_type: AnomalyType,
    pub severity: Severity,
    pub confidence: f64,
}

impl Classification {
    #[must_use]
    pub const fn recommended_action(&self) -> &'static str {
        self.anomaly_type.recommended_action()
    }

    #[must_use]
    pub fn is_anomalous(&self) -> bool {
        self.severity > Severity::None
    }
}

/// Broadcast only for anomalous readings, those with severity above
/// [`Severity::None`]. Every ingest still returns one in its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyAlert {
    pub sensor_id: SensorId,
    pub anomaly_type: AnomalyType,
    pub severity: Severity,
    pub confidence: f64,
    pub recommended_action: String,
    pub observed_at: DateTime<Utc>,
}

impl AnomalyAlert {
    #[must_use]
    pub fn new(reading: &SensorReading, classification: Classification) -> Self {
        Self {
            sensor_id: reading.sensor_id.clone(),
            anomaly_type: classification.anomaly_type,
            severity: classification.severity,
            confidence: classification.confidence,
            recommended_action: classification.recommended_action().to_owned(),
            observed_at: reading.timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    #[default]
    Sensor,
}

/// A suspected leak raised from critical telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakEvent {
    pub id: LeakEventId,
    pub sensor_id: SensorId,
    /// `None` when the sensor is not mapped to a ward.
    pub ward_id: Option<WardId>,
    pub confidence: f64,
    /// Heuristic estimate, see the leak synthesizer for the multiplier.
    pub estimated_loss_lph: f64,
    pub detected_by: DetectionSource,
    pub detected_at: DateTime<Utc>,
}
