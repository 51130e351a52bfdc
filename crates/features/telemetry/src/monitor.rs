use crate::health::{self, SensorHealth};
use crate::reading::RawReading;
use crate::{
    AnomalyClassifier, LeakDetection, LeakSynthesizer, SensorTable, TelemetryError,
    TelemetryErrorExt,
};
use jal_domain::config::{AnomalyConfig, LeakConfig, SensorHealthConfig};
use jal_domain::{AnomalyAlert, SensorId, SensorReading, Severity, TicketId};
use jal_kernel::batch::BatchReport;
use jal_kernel::clock::Clock;
use jal_kernel::directory::SensorDirectory;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of ingesting one reading.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryOutcome {
    pub reading: SensorReading,
    pub alert: AnomalyAlert,
    /// Present when the reading raised a new leak.
    pub leak: Option<LeakDetection>,
    /// Critical reading whose leak was already covered by an open ticket.
    pub suppressed_duplicate: bool,
}

/// Validates, classifies and escalates readings, keeping per-sensor state.
#[derive(Debug)]
pub struct TelemetryMonitor {
    classifier: AnomalyClassifier,
    synthesizer: LeakSynthesizer,
    table: SensorTable,
    sensors: Arc<dyn SensorDirectory>,
    clock: Arc<dyn Clock>,
    health: SensorHealthConfig,
}

impl TelemetryMonitor {
    /// # Errors
    /// Returns [`TelemetryError::InvalidConfiguration`] for inconsistent
    /// anomaly thresholds or an invalid leak confidence band.
    pub fn new(
        anomaly: AnomalyConfig,
        leak: LeakConfig,
        p1_threshold: u32,
        p1_sla_hours: u32,
        sensors: Arc<dyn SensorDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TelemetryError> {
        let health = anomaly.health.clone();
        let classifier = AnomalyClassifier::new(anomaly).context("anomaly thresholds")?;
        let synthesizer =
            LeakSynthesizer::new(leak, p1_threshold, p1_sla_hours).context("leak settings")?;

        Ok(Self { classifier, synthesizer, table: SensorTable::new(), sensors, clock, health })
    }

    #[must_use]
    pub const fn classifier(&self) -> &AnomalyClassifier {
        &self.classifier
    }

    #[must_use]
    pub const fn table(&self) -> &SensorTable {
        &self.table
    }

    /// Ingests one reading.
    ///
    /// The sensor's slot stays locked from classification through the
    /// open-ticket check, so two critical readings for the same sensor can
    /// never both raise a ticket.
    ///
    /// # Errors
    /// Returns [`TelemetryError::MalformedReading`]. Sensor state is left
    /// as it was.
    pub fn ingest(&self, raw: RawReading) -> Result<TelemetryOutcome, TelemetryError> {
        let now = self.clock.now();
        let sensor_id = raw.sensor_id.clone();
        let reading = match raw.validate(now) {
            Ok(reading) => reading,
            Err(err) => {
                warn!(sensor_id = %sensor_id, kind = err.kind(), error = %err, "Reading discarded");
                return Err(err);
            },
        };

        let slot = self.table.slot(&reading.sensor_id);
        let mut slot = slot.lock();

        let classification = self.classifier.classify(&reading, slot.last.as_ref());
        slot.last = Some(reading.clone());
        let alert = AnomalyAlert::new(&reading, classification);

        let mut leak = None;
        let mut suppressed_duplicate = false;
        if classification.severity == Severity::Critical {
            let open = slot
                .open_leak_ticket
                .clone()
                .filter(|_| self.synthesizer.dedupe_open_tickets());
            if let Some(open) = open {
                debug!(
                    sensor_id = %reading.sensor_id,
                    ticket_id = %open,
                    pressure = reading.pressure,
                    "Leak already ticketed, suppressing duplicate"
                );
                suppressed_duplicate = true;
            } else {
                let ward_id = self.sensors.ward_of(&reading.sensor_id);
                let detection = self.synthesizer.synthesize(&reading, classification, ward_id, now);
                slot.open_leak_ticket = Some(detection.ticket.id.clone());
                info!(
                    sensor_id = %reading.sensor_id,
                    leak_id = %detection.event.id,
                    ticket_id = %detection.ticket.id,
                    ward_id = ?ward_id,
                    pressure = reading.pressure,
                    confidence = detection.event.confidence,
                    "Leak detected"
                );
                leak = Some(detection);
            }
        } else if classification.is_anomalous() {
            debug!(
                sensor_id = %reading.sensor_id,
                anomaly = ?classification.anomaly_type,
                severity = ?classification.severity,
                "Anomaly classified"
            );
        }

        Ok(TelemetryOutcome { reading, alert, leak, suppressed_duplicate })
    }

    /// Ingests readings in order. A malformed reading never stops the rest.
    pub fn ingest_batch(
        &self,
        readings: impl IntoIterator<Item = RawReading>,
    ) -> BatchReport<TelemetryOutcome, TelemetryError> {
        BatchReport::collect(readings, |raw| self.ingest(raw))
    }

    /// Releases the sensor holding `ticket` so the next critical reading
    /// raises a fresh leak. Returns that sensor, or `None` when the ticket
    /// was not a leak ticket held by this monitor.
    pub fn resolve_leak_ticket(&self, ticket: &TicketId) -> Option<SensorId> {
        let released = self.table.release_ticket(ticket);
        if let Some(sensor) = &released {
            info!(sensor_id = %sensor, ticket_id = %ticket, "Leak ticket resolved");
        }
        released
    }

    #[must_use]
    pub fn sensor_health(&self, sensor: &SensorId) -> SensorHealth {
        let last = self.table.last_reading(sensor);
        self.assess(sensor.clone(), last.as_ref())
    }

    /// Health for every sensor seen so far, ordered by sensor id.
    #[must_use]
    pub fn fleet_health(&self) -> Vec<SensorHealth> {
        self.table
            .snapshot()
            .into_iter()
            .map(|(sensor, last)| self.assess(sensor, last.as_ref()))
            .collect()
    }

    fn assess(&self, sensor: SensorId, last: Option<&SensorReading>) -> SensorHealth {
        let thresholds = self.classifier.thresholds();
        health::assess(
            sensor,
            last,
            self.clock.now(),
            &self.health,
            thresholds.critical_pressure,
            thresholds.low_pressure,
        )
    }
}
