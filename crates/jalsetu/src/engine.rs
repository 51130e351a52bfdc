use crate::{EngineError, EngineErrorExt, TicketBook};
use chrono::{DateTime, Duration, Utc};
use jal_domain::config::EngineConfig;
use jal_domain::{
    CitywideEquityReport, Complaint, ComplaintStatus, Degradation, EquitySnapshot, SensorId,
    SensorReading, Severity, TicketId, TicketOrigin, TicketRequest, WardId,
};
use jal_equity::{EquityScorer, WardAggregator, validate_config};
use jal_event_bus::{Event, EventBus};
use jal_kernel::batch::BatchReport;
use jal_kernel::clock::{Clock, SystemClock};
use jal_kernel::directory::{ComplaintLog, ReadingHistory, SensorDirectory, WardDirectory};
use jal_kernel::ids::ticket_id;
use jal_kernel::memory::{InMemoryComplaintLog, InMemoryReadingLog, InMemoryRegistry};
use jal_priority::queue::{RankedTicket, rank_open_tickets};
use jal_priority::{IssueMatcher, KeywordMatcher, PriorityScorer};
use jal_telemetry::health::SensorHealth;
use jal_telemetry::reading::RawReading;
use jal_telemetry::stats::ReadingStats;
use jal_telemetry::{TelemetryMonitor, TelemetryOutcome};
use serde::Serialize;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{info, warn};

/// Ticket raised for a complaint, plus the inputs that could not be used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintOutcome {
    pub ticket: TicketRequest,
    pub degradations: Vec<Degradation>,
}

#[derive(Debug)]
pub struct DecisionEngineInner {
    pub config: EngineConfig,
    pub events: EventBus,
    pub tickets: TicketBook,
    clock: Arc<dyn Clock>,
    sensors: Arc<dyn SensorDirectory>,
    complaints: Arc<dyn ComplaintLog>,
    readings: Arc<dyn ReadingHistory>,
    priority: PriorityScorer,
    telemetry: TelemetryMonitor,
    equity: EquityScorer,
}

/// The engine service object. Cheap to clone; clones share all state.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    inner: Arc<DecisionEngineInner>,
}

impl Deref for DecisionEngine {
    type Target = DecisionEngineInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DecisionEngine {
    #[must_use]
    pub fn builder() -> DecisionEngineBuilder {
        DecisionEngineBuilder::default()
    }

    /// Scores and records a complaint, then opens and publishes its ticket.
    ///
    /// The complaint is scored before it is recorded, so it never counts
    /// toward its own "recent complaints" factor. When the complaint names a
    /// ward, the lowest last reading among that ward's sensors is used for
    /// sensor corroboration.
    ///
    /// # Errors
    /// Returns [`EngineError::Priority`] for an already resolved complaint.
    pub fn submit_complaint(&self, complaint: Complaint) -> Result<ComplaintOutcome, EngineError> {
        let correlated = complaint.ward_id.and_then(|ward| self.lowest_reading_in(ward));
        let assessment = self
            .priority
            .assess(&complaint, correlated.as_ref())
            .context(format!("complaint {}", complaint.id))?;

        let degradations = assessment.degradations.clone();
        let ticket = assessment.into_ticket(ticket_id(), TicketOrigin::Complaint(complaint.id));

        info!(
            complaint_id = %complaint.id,
            ticket_id = %ticket.id,
            tier = %ticket.tier,
            score = ticket.score,
            "Complaint ticketed"
        );

        self.complaints.record(complaint);
        self.tickets.open(ticket.clone());
        self.emit(ticket.clone());

        Ok(ComplaintOutcome { ticket, degradations })
    }

    /// Each complaint is handled independently; failures are collected.
    pub fn submit_complaints(
        &self,
        complaints: impl IntoIterator<Item = Complaint>,
    ) -> BatchReport<ComplaintOutcome, EngineError> {
        BatchReport::collect(complaints, |complaint| self.submit_complaint(complaint))
    }

    /// Validates and classifies one reading, publishing its alert and any
    /// leak it raises.
    ///
    /// # Errors
    /// Returns [`EngineError::Telemetry`] for a malformed reading.
    pub fn ingest_reading(&self, raw: RawReading) -> Result<TelemetryOutcome, EngineError> {
        let outcome = self.telemetry.ingest(raw)?;
        self.readings.record(&outcome.reading);

        if outcome.alert.severity > Severity::None {
            self.emit(outcome.alert.clone());
        }
        if let Some(leak) = &outcome.leak {
            self.tickets.open(leak.ticket.clone());
            self.emit(leak.event.clone());
            self.emit(leak.ticket.clone());
        }
        Ok(outcome)
    }

    pub fn ingest_readings(
        &self,
        readings: impl IntoIterator<Item = RawReading>,
    ) -> BatchReport<TelemetryOutcome, EngineError> {
        BatchReport::collect(readings, |raw| self.ingest_reading(raw))
    }

    /// Closes an open ticket. A complaint ticket marks its complaint
    /// resolved; a leak ticket re-arms leak detection for its sensor.
    ///
    /// The ticket stays open when its complaint cannot be updated.
    ///
    /// # Errors
    /// Returns [`EngineError::UnknownTicket`] when the ticket is not open, or
    /// [`EngineError::Kernel`] when the complaint log rejects the update.
    pub fn resolve_ticket(&self, id: &TicketId) -> Result<TicketRequest, EngineError> {
        let unknown = || EngineError::UnknownTicket { message: id.to_string().into(), context: None };
        let open = self.tickets.get(id).ok_or_else(unknown)?;

        if let TicketOrigin::Complaint(complaint) = &open.origin {
            self.complaints
                .set_status(*complaint, ComplaintStatus::Resolved)
                .context(format!("resolving ticket {id}"))?;
        }

        let ticket = self.tickets.close(id).ok_or_else(unknown)?;
        if let TicketOrigin::LeakEvent(_) = &ticket.origin {
            self.telemetry.resolve_leak_ticket(id);
        }

        info!(ticket_id = %id, tier = %ticket.tier, "Ticket resolved");
        Ok(ticket)
    }

    /// Open tickets ordered by tier, then deadline.
    #[must_use]
    pub fn open_tickets(&self, limit: usize) -> Vec<RankedTicket> {
        let open = self.tickets.open_tickets();
        rank_open_tickets(&open, self.clock.now(), limit)
    }

    /// # Errors
    /// Returns [`EngineError::Equity`] for an unknown ward.
    pub fn ward_equity(&self, ward: WardId) -> Result<EquitySnapshot, EngineError> {
        let snapshot = self.equity.ward_equity(ward)?;
        self.emit(snapshot.clone());
        Ok(snapshot)
    }

    /// Scores every ward, publishes each snapshot and replaces the latest
    /// citywide report on its watch channel.
    pub fn citywide_equity(&self) -> CitywideEquityReport {
        let report = self.equity.citywide();
        for snapshot in &report.wards {
            self.emit(snapshot.clone());
        }
        if let Err(err) = self.events.publish_watch(report.clone()) {
            warn!(kind = err.kind(), error = %err, "Citywide report not published");
        }
        report
    }

    /// Last report published by [`Self::citywide_equity`].
    ///
    /// # Errors
    /// Returns [`EngineError::Events`] when the report type is registered
    /// on the bus as a broadcast channel.
    pub fn latest_citywide(&self) -> Result<Option<Arc<CitywideEquityReport>>, EngineError> {
        Ok(self.events.latest::<CitywideEquityReport>()?)
    }

    #[must_use]
    pub fn sensor_health(&self, sensor: &SensorId) -> SensorHealth {
        self.telemetry.sensor_health(sensor)
    }

    #[must_use]
    pub fn fleet_health(&self) -> Vec<SensorHealth> {
        self.telemetry.fleet_health()
    }

    /// Statistics over the trailing `window` of recorded readings, for one
    /// sensor or every sensor. `None` when no reading falls inside.
    #[must_use]
    pub fn reading_stats(&self, sensor: Option<&SensorId>, window: Duration) -> Option<ReadingStats> {
        let since = self.clock.now().checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC);
        let readings = self.readings.readings_since(since);
        ReadingStats::from_readings(
            readings.iter().filter(|r| sensor.is_none_or(|sensor| &r.sensor_id == sensor)),
        )
    }

    fn lowest_reading_in(&self, ward: WardId) -> Option<SensorReading> {
        self.sensors
            .sensors_in(ward)
            .iter()
            .filter_map(|sensor| self.telemetry.table().last_reading(sensor))
            .min_by(|a, b| a.pressure.total_cmp(&b.pressure))
    }

    /// Publish failures never fail the operation that produced the event.
    fn emit<T: Event>(&self, event: T) {
        if let Err(err) = self.events.publish(event) {
            warn!(
                event = std::any::type_name::<T>(),
                kind = err.kind(),
                error = %err,
                "Event not published"
            );
        }
    }
}

/// A fluent builder for the [`DecisionEngine`].
///
/// Ward and sensor directories are required. Everything else falls back to
/// defaults: config defaults, the system clock, in-memory complaint and
/// reading logs, a fresh event bus and the configured keyword matcher.
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct DecisionEngineBuilder {
    config: Option<EngineConfig>,
    clock: Option<Arc<dyn Clock>>,
    wards: Option<Arc<dyn WardDirectory>>,
    sensors: Option<Arc<dyn SensorDirectory>>,
    complaints: Option<Arc<dyn ComplaintLog>>,
    readings: Option<Arc<dyn ReadingHistory>>,
    events: Option<EventBus>,
    matcher: Option<Arc<dyn IssueMatcher>>,
}

impl DecisionEngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn wards(mut self, wards: Arc<dyn WardDirectory>) -> Self {
        self.wards = Some(wards);
        self
    }

    pub fn sensors(mut self, sensors: Arc<dyn SensorDirectory>) -> Self {
        self.sensors = Some(sensors);
        self
    }

    /// Uses one in-memory registry as both ward and sensor directory.
    pub fn registry(self, registry: Arc<InMemoryRegistry>) -> Self {
        self.wards(registry.clone()).sensors(registry)
    }

    pub fn complaints(mut self, complaints: Arc<dyn ComplaintLog>) -> Self {
        self.complaints = Some(complaints);
        self
    }

    pub fn readings(mut self, readings: Arc<dyn ReadingHistory>) -> Self {
        self.readings = Some(readings);
        self
    }

    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn matcher(mut self, matcher: Arc<dyn IssueMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// # Errors
    /// Returns [`EngineError::Validation`] when a directory is missing, or
    /// the component error for an invalid configuration section.
    pub fn build(self) -> Result<DecisionEngine, EngineError> {
        let wards = self.wards.ok_or_else(|| EngineError::Validation {
            message: "ward directory not provided".into(),
            context: None,
        })?;
        let sensors = self.sensors.ok_or_else(|| EngineError::Validation {
            message: "sensor directory not provided".into(),
            context: None,
        })?;

        let config = self.config.unwrap_or_default();
        validate_config(&config.equity).context("equity section")?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let complaints = self.complaints.unwrap_or_else(|| Arc::new(InMemoryComplaintLog::new()));
        let readings = self.readings.unwrap_or_else(|| {
            Arc::new(InMemoryReadingLog::with_retention(Duration::hours(
                config.equity.pressure_window_hours,
            )))
        });
        let events = self.events.unwrap_or_default();
        let matcher = self
            .matcher
            .unwrap_or_else(|| Arc::new(KeywordMatcher::new(&config.priority.keywords)));

        let priority = PriorityScorer::new(
            config.priority.clone(),
            clock.clone(),
            wards.clone(),
            complaints.clone(),
            matcher,
        )
        .context("priority section")?;

        let telemetry = TelemetryMonitor::new(
            config.anomaly.clone(),
            config.leak.clone(),
            config.priority.p1_threshold,
            config.priority.p1_sla_hours,
            sensors.clone(),
            clock.clone(),
        )
        .context("anomaly and leak sections")?;

        let aggregator = WardAggregator::new(
            &config.equity,
            wards,
            sensors.clone(),
            readings.clone(),
            complaints.clone(),
        );
        let equity = EquityScorer::new(config.equity.clone(), aggregator, clock.clone())
            .context("equity section")?;

        info!(
            p1_threshold = config.priority.p1_threshold,
            dedupe_leaks = config.leak.dedupe_open_tickets,
            "Decision engine ready"
        );

        Ok(DecisionEngine {
            inner: Arc::new(DecisionEngineInner {
                config,
                events,
                tickets: TicketBook::new(),
                clock,
                sensors,
                complaints,
                readings,
                priority,
                telemetry,
                equity,
            }),
        })
    }
}
