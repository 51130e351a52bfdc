use crate::TelemetryError;
use chrono::{DateTime, Duration, Utc};
use jal_domain::config::{LeakConfig, MAX_HORIZON_HOURS};
use jal_domain::{
    Classification, DetectionSource, Factor, FactorHit, LeakEvent, PriorityTier, SensorReading,
    TicketOrigin, TicketRequest, WardId,
};
use jal_kernel::ids::{leak_event_id, ticket_id};
use serde::Serialize;

const MINUTES_PER_DAY: f64 = 60.0 * 24.0;

/// Leak event plus the forced-P1 ticket raised for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeakDetection {
    pub event: LeakEvent,
    pub ticket: TicketRequest,
}

/// Builds leak events and their tickets from critical classifications.
///
/// Tickets bypass complaint scoring: the tier is always P1, the score is
/// the P1 threshold and the only factor is `critical_telemetry`.
#[derive(Debug, Clone)]
pub struct LeakSynthesizer {
    config: LeakConfig,
    p1_threshold: u32,
    p1_sla_hours: u32,
}

impl LeakSynthesizer {
    /// # Errors
    /// Returns [`TelemetryError::InvalidConfiguration`] when the confidence
    /// band is empty or outside `[0, 1]`, the loss fraction is negative or
    /// the SLA lies outside `1..=MAX_HORIZON_HOURS`.
    pub fn new(
        config: LeakConfig,
        p1_threshold: u32,
        p1_sla_hours: u32,
    ) -> Result<Self, TelemetryError> {
        let band_ok = (0.0..=1.0).contains(&config.min_confidence)
            && (0.0..=1.0).contains(&config.max_confidence)
            && config.min_confidence <= config.max_confidence;
        if !band_ok {
            return Err(TelemetryError::InvalidConfiguration {
                message: format!(
                    "leak confidence band {}..{} is not a sub-range of [0, 1]",
                    config.min_confidence, config.max_confidence
                )
                .into(),
                context: None,
            });
        }
        if !(config.loss_fraction.is_finite() && config.loss_fraction >= 0.0) {
            return Err(TelemetryError::InvalidConfiguration {
                message: format!("loss_fraction {} must be >= 0", config.loss_fraction).into(),
                context: None,
            });
        }
        if !(1..=MAX_HORIZON_HOURS).contains(&p1_sla_hours) {
            return Err(TelemetryError::InvalidConfiguration {
                message: format!("p1_sla_hours {p1_sla_hours} must lie in 1..={MAX_HORIZON_HOURS}")
                    .into(),
                context: None,
            });
        }
        Ok(Self { config, p1_threshold, p1_sla_hours })
    }

    #[must_use]
    pub const fn dedupe_open_tickets(&self) -> bool {
        self.config.dedupe_open_tickets
    }

    /// Estimated litres lost, assuming `loss_fraction` of a full day's flow
    /// at the current rate. A coarse heuristic, not a hydraulic model.
    #[must_use]
    pub fn estimated_loss(&self, flow: f64) -> f64 {
        flow * MINUTES_PER_DAY * self.config.loss_fraction
    }

    #[must_use]
    pub fn synthesize(
        &self,
        reading: &SensorReading,
        classification: Classification,
        ward_id: Option<WardId>,
        now: DateTime<Utc>,
    ) -> LeakDetection {
        let confidence =
            classification.confidence.clamp(self.config.min_confidence, self.config.max_confidence);

        let event = LeakEvent {
            id: leak_event_id(),
            sensor_id: reading.sensor_id.clone(),
            ward_id,
            confidence,
            estimated_loss_lph: self.estimated_loss(reading.flow),
            detected_by: DetectionSource::Sensor,
            detected_at: now,
        };

        let ticket = TicketRequest {
            id: ticket_id(),
            origin: TicketOrigin::LeakEvent(event.id.clone()),
            tier: PriorityTier::P1,
            score: self.p1_threshold,
            sla_hours: self.p1_sla_hours,
            created_at: now,
            sla_deadline: now + Duration::hours(i64::from(self.p1_sla_hours)),
            factors: vec![FactorHit::new(
                Factor::CriticalTelemetry,
                self.p1_threshold,
                format!(
                    "Sensor {} reports {} bar ({:?})",
                    reading.sensor_id, reading.pressure, classification.anomaly_type
                ),
            )],
        };

        LeakDetection { event, ticket }
    }
}

impl Default for LeakSynthesizer {
    fn default() -> Self {
        Self { config: LeakConfig::default(), p1_threshold: 25, p1_sla_hours: 4 }
    }
}
