use crate::TelemetryError;
use jal_domain::config::AnomalyConfig;
use jal_domain::{AnomalyType, Classification, SensorReading, Severity};

/// Rule-based single-reading classifier.
///
/// Rules, first match wins:
///
/// | rule | type | confidence | severity |
/// |---|---|---|---|
/// | pressure < critical | `CRITICAL_LOW_PRESSURE` | 0.9 | critical |
/// | pressure < low | `LOW_PRESSURE` | 0.7 | high |
/// | \|pressure - previous\| > spike delta | `PRESSURE_SPIKE` | 0.6 | medium |
/// | flow < low flow | `LOW_FLOW` | 0.5 | medium |
/// | flow > high flow | `HIGH_FLOW` | 0.5 | medium |
/// | otherwise | `NORMAL` | 0.0 | none |
#[derive(Debug, Clone)]
pub struct AnomalyClassifier {
    thresholds: AnomalyConfig,
}

impl AnomalyClassifier {
    /// # Errors
    /// Returns [`TelemetryError::InvalidConfiguration`] when the critical
    /// threshold is above the low-pressure threshold, the flow band is
    /// inverted, or any threshold is not finite.
    pub fn new(thresholds: AnomalyConfig) -> Result<Self, TelemetryError> {
        let values = [
            thresholds.critical_pressure,
            thresholds.low_pressure,
            thresholds.spike_delta,
            thresholds.low_flow,
            thresholds.high_flow,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(TelemetryError::InvalidConfiguration {
                message: "anomaly thresholds must be finite".into(),
                context: None,
            });
        }
        if thresholds.critical_pressure > thresholds.low_pressure
            || thresholds.low_flow > thresholds.high_flow
        {
            return Err(TelemetryError::InvalidConfiguration {
                message: format!(
                    "inconsistent thresholds: critical {} / low {} bar, flow band {}..{}",
                    thresholds.critical_pressure,
                    thresholds.low_pressure,
                    thresholds.low_flow,
                    thresholds.high_flow
                )
                .into(),
                context: None,
            });
        }
        Ok(Self { thresholds })
    }

    #[must_use]
    pub const fn thresholds(&self) -> &AnomalyConfig {
        &self.thresholds
    }

    /// Classifies `reading` given the sensor's previous accepted reading.
    #[must_use]
    pub fn classify(&self, reading: &SensorReading, previous: Option<&SensorReading>) -> Classification {
        let t = &self.thresholds;
        let (anomaly_type, confidence, severity) = if reading.pressure < t.critical_pressure {
            (AnomalyType::CriticalLowPressure, 0.9, Severity::Critical)
        } else if reading.pressure < t.low_pressure {
            (AnomalyType::LowPressure, 0.7, Severity::High)
        } else if previous.is_some_and(|p| (reading.pressure - p.pressure).abs() > t.spike_delta) {
            (AnomalyType::PressureSpike, 0.6, Severity::Medium)
        } else if reading.flow < t.low_flow {
            (AnomalyType::LowFlow, 0.5, Severity::Medium)
        } else if reading.flow > t.high_flow {
            (AnomalyType::HighFlow, 0.5, Severity::Medium)
        } else {
            (AnomalyType::Normal, 0.0, Severity::None)
        };

        Classification { anomaly_type, severity, confidence }
    }
}

impl Default for AnomalyClassifier {
    fn default() -> Self {
        Self { thresholds: AnomalyConfig::default() }
    }
}
