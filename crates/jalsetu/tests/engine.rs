use chrono::{DateTime, Duration, TimeZone, Utc};
use jalsetu::domain::{
    AnomalyAlert, AnomalyType, CitywideEquityReport, Complaint, ComplaintId, ComplaintStatus,
    Factor, LeakEvent, PriorityTier, SensorId, TicketOrigin, TicketRequest, Ward, WardId,
};
use jalsetu::events::EventReceiverExt;
use jalsetu::kernel::KernelError;
use jalsetu::kernel::clock::FixedClock;
use jalsetu::kernel::directory::{ComplaintLog, ComplaintStats};
use jalsetu::kernel::memory::{InMemoryComplaintLog, InMemoryRegistry};
use jalsetu::priority::queue::Urgency;
use jalsetu::telemetry::reading::RawReading;
use jalsetu::{DecisionEngine, EngineError};
use std::sync::Arc;

// 14:00 UTC, outside both default peak windows.
fn off_peak() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 3, 14, 0, 0).unwrap()
}

struct Fixture {
    engine: DecisionEngine,
    clock: Arc<FixedClock>,
    complaints: Arc<InMemoryComplaintLog>,
}

fn registry() -> Arc<InMemoryRegistry> {
    let registry = Arc::new(InMemoryRegistry::with_wards([
        Ward {
            id: WardId(12),
            name: "Yerawada".to_owned(),
            population: 55_000,
            avg_supply_hours: 3.5,
            equity_score: 0.6,
        },
        Ward {
            id: WardId(13),
            name: "Baner".to_owned(),
            population: 20_000,
            avg_supply_hours: 9.0,
            equity_score: 1.4,
        },
    ]));
    registry.map_sensor("S-12a", WardId(12)).unwrap();
    registry.map_sensor("S-12b", WardId(12)).unwrap();
    registry.map_sensor("S-13a", WardId(13)).unwrap();
    registry
}

fn fixture() -> Fixture {
    let registry = registry();
    let clock = Arc::new(FixedClock::new(off_peak()));
    let complaints = Arc::new(InMemoryComplaintLog::new());
    let engine = DecisionEngine::builder()
        .registry(registry)
        .clock(clock.clone())
        .complaints(complaints.clone())
        .build()
        .unwrap();
    Fixture { engine, clock, complaints }
}

fn complaint(id: u64, issue: &str, ward: u32) -> Complaint {
    Complaint {
        id: ComplaintId(id),
        ward_id: Some(WardId(ward)),
        issue: issue.to_owned(),
        location: None,
        created_at: off_peak() - Duration::hours(1),
        status: ComplaintStatus::Pending,
    }
}

#[tokio::test]
async fn backlog_in_underserved_ward_yields_p1_ticket() -> Result<(), EngineError> {
    let Fixture { engine, .. } = fixture();
    let mut tickets = engine.events.subscribe::<TicketRequest>()?;

    for id in 1..=3 {
        engine.submit_complaint(complaint(id, "low pressure", 12))?;
    }
    let outcome = engine.submit_complaint(complaint(4, "No water since morning", 12))?;

    assert_eq!(outcome.ticket.score, 45);
    assert_eq!(outcome.ticket.tier, PriorityTier::P1);
    assert_eq!(outcome.ticket.sla_deadline, off_peak() + Duration::hours(4));
    assert_eq!(outcome.ticket.origin, TicketOrigin::Complaint(ComplaintId(4)));
    assert!(outcome.degradations.is_empty());

    let published = tickets.drain_ready();
    assert_eq!(published.len(), 4);
    assert_eq!(published[3].id, outcome.ticket.id);
    assert_eq!(engine.tickets.len(), 4);
    Ok(())
}

#[tokio::test]
async fn critical_reading_raises_one_leak_and_corroborates_complaints() -> Result<(), EngineError> {
    let Fixture { engine, clock, .. } = fixture();
    let mut leaks = engine.events.subscribe::<LeakEvent>()?;
    let mut alerts = engine.events.subscribe::<AnomalyAlert>()?;

    engine.ingest_reading(RawReading::new("S-12a", 2.0, 120.0))?;
    engine.ingest_reading(RawReading::new("S-12b", 2.6, 120.0))?;
    let critical = engine.ingest_reading(RawReading::new("S-12a", 1.2, 120.0))?;
    let leak = critical.leak.expect("critical drop raises a leak");

    clock.advance(Duration::seconds(30));
    let repeat = engine.ingest_reading(RawReading::new("S-12a", 1.1, 118.0))?;
    assert!(repeat.suppressed_duplicate);

    let published = leaks.drain_ready();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].ward_id, Some(WardId(12)));

    let alert_types: Vec<AnomalyType> = alerts.drain_ready().iter().map(|a| a.anomaly_type).collect();
    assert_eq!(alert_types, [AnomalyType::CriticalLowPressure, AnomalyType::CriticalLowPressure]);

    let ranked = engine.open_tickets(10);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].ticket.id, leak.ticket.id);
    assert_eq!(ranked[0].urgency, Urgency::High);

    let outcome = engine.submit_complaint(complaint(9, "tap is dry", 12))?;
    let corroboration = outcome
        .ticket
        .factors
        .iter()
        .find(|f| f.factor == Factor::SensorCorroboration)
        .expect("lowest ward reading corroborates");
    assert_eq!(corroboration.detail, "Sensor confirms low pressure: 1.1 bar");
    Ok(())
}

#[tokio::test]
async fn resolving_a_leak_ticket_rearms_the_sensor() -> Result<(), EngineError> {
    let Fixture { engine, .. } = fixture();

    let first = engine.ingest_reading(RawReading::new("S-13a", 0.8, 90.0))?.leak.unwrap();
    let resolved = engine.resolve_ticket(&first.ticket.id)?;
    assert_eq!(resolved.id, first.ticket.id);
    assert!(engine.tickets.is_empty());

    let second = engine.ingest_reading(RawReading::new("S-13a", 0.7, 90.0))?;
    assert!(second.leak.is_some());
    Ok(())
}

#[tokio::test]
async fn resolving_a_complaint_ticket_resolves_the_complaint() -> Result<(), EngineError> {
    let Fixture { engine, complaints, .. } = fixture();

    let outcome = engine.submit_complaint(complaint(21, "leak near school", 13))?;
    engine.resolve_ticket(&outcome.ticket.id)?;

    assert_eq!(complaints.get(ComplaintId(21)).map(|c| c.status), Some(ComplaintStatus::Resolved));
    let err = engine.resolve_ticket(&outcome.ticket.id).unwrap_err();
    assert_eq!(err.kind(), "unknown_ticket");
    Ok(())
}

#[tokio::test]
async fn batches_isolate_failures() {
    let Fixture { engine, .. } = fixture();

    let mut resolved = complaint(31, "no water", 13);
    resolved.status = ComplaintStatus::Resolved;
    let report = engine.submit_complaints([
        complaint(30, "no water", 13),
        resolved,
        complaint(32, "low pressure", 99),
    ]);

    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].index, 1);
    assert_eq!(report.failed[0].error.kind(), "priority");
    assert!(!report.succeeded[1].degradations.is_empty());

    let readings = engine.ingest_readings([
        RawReading { pressure: None, ..RawReading::new("S-12a", 0.0, 10.0) },
        RawReading::new("S-12a", 3.0, 150.0),
    ]);
    assert_eq!((readings.succeeded.len(), readings.failed.len()), (1, 1));
    assert_eq!(readings.failed[0].error.kind(), "telemetry");
}

#[tokio::test]
async fn citywide_report_is_kept_on_the_watch_channel() -> Result<(), EngineError> {
    let Fixture { engine, .. } = fixture();
    assert!(engine.latest_citywide()?.is_none());

    engine.ingest_reading(RawReading::new("S-12a", 1.8, 120.0))?;
    engine.ingest_reading(RawReading::new("S-13a", 3.4, 120.0))?;

    let report = engine.citywide_equity();
    assert_eq!(report.ward_count, 2);
    assert_eq!(report.wards[0].ward_id, WardId(12));

    let latest: Arc<CitywideEquityReport> = engine.latest_citywide()?.unwrap();
    assert_eq!(*latest, report);

    let snapshot = engine.ward_equity(WardId(13))?;
    assert!(snapshot.score > 1.0);
    assert_eq!(engine.ward_equity(WardId(77)).unwrap_err().kind(), "equity");
    Ok(())
}

#[tokio::test]
async fn health_covers_every_reporting_sensor() -> Result<(), EngineError> {
    let Fixture { engine, .. } = fixture();
    engine.ingest_reading(RawReading::new("S-12a", 3.0, 150.0))?;
    engine.ingest_reading(RawReading::new("S-13a", 1.9, 150.0))?;

    let fleet = engine.fleet_health();
    assert_eq!(fleet.len(), 2);
    assert_eq!(engine.sensor_health(&SensorId::from("S-12b")).last_seen, None);
    Ok(())
}

#[tokio::test]
async fn a_skewed_sensor_clock_leaves_other_wards_history_alone() -> Result<(), EngineError> {
    let Fixture { engine, .. } = fixture();
    engine.ingest_reading(RawReading::new("S-12a", 4.0, 150.0).at(off_peak() - Duration::minutes(5)))?;

    let skewed = RawReading::new("S-13a", 1.0, 150.0).at(off_peak() + Duration::days(365));
    assert_eq!(engine.ingest_reading(skewed).unwrap_err().kind(), "telemetry");

    let yerawada = engine.ward_equity(WardId(12))?;
    assert_eq!(yerawada.metrics.avg_pressure, Some(4.0));
    assert_eq!(engine.sensor_health(&SensorId::from("S-13a")).last_seen, None);
    Ok(())
}

#[tokio::test]
async fn reading_stats_cover_the_trailing_window() -> Result<(), EngineError> {
    let Fixture { engine, clock, .. } = fixture();
    engine.ingest_reading(RawReading::new("S-12a", 1.0, 40.0))?;

    clock.advance(Duration::hours(2));
    engine.ingest_reading(RawReading::new("S-12a", 3.0, 100.0))?;
    engine.ingest_reading(RawReading::new("S-12b", 2.0, 200.0))?;

    let sensor = SensorId::from("S-12a");
    let recent = engine.reading_stats(Some(&sensor), Duration::hours(1)).expect("one recent reading");
    assert_eq!(recent.count, 1);
    assert!((recent.avg_pressure - 3.0).abs() < f64::EPSILON);

    let day = engine.reading_stats(None, Duration::hours(24)).expect("three readings");
    assert_eq!(day.count, 3);
    assert!((day.min_pressure - 1.0).abs() < f64::EPSILON);
    assert!((day.max_pressure - 3.0).abs() < f64::EPSILON);
    assert!((day.avg_flow - 340.0 / 3.0).abs() < 1e-9);

    assert_eq!(engine.reading_stats(Some(&SensorId::from("S-13a")), Duration::hours(24)), None);
    Ok(())
}

/// Records complaints but refuses every status change.
#[derive(Debug, Default)]
struct FrozenComplaintLog(InMemoryComplaintLog);

impl ComplaintStats for FrozenComplaintLog {
    fn unresolved_since(&self, ward: WardId, since: DateTime<Utc>) -> u32 {
        self.0.unresolved_since(ward, since)
    }
}

impl ComplaintLog for FrozenComplaintLog {
    fn record(&self, complaint: Complaint) {
        self.0.record(complaint);
    }

    fn complaint(&self, id: ComplaintId) -> Option<Complaint> {
        self.0.get(id)
    }

    fn set_status(&self, id: ComplaintId, _status: ComplaintStatus) -> Result<(), KernelError> {
        Err(KernelError::UnknownComplaint { message: id.to_string().into(), context: None })
    }
}

#[tokio::test]
async fn failed_complaint_update_keeps_the_ticket_open() -> Result<(), EngineError> {
    let engine = DecisionEngine::builder()
        .registry(registry())
        .clock(Arc::new(FixedClock::new(off_peak())))
        .complaints(Arc::new(FrozenComplaintLog::default()))
        .build()?;

    let outcome = engine.submit_complaint(complaint(41, "no water", 13))?;
    let err = engine.resolve_ticket(&outcome.ticket.id).unwrap_err();
    assert_eq!(err.kind(), "kernel");

    assert!(engine.tickets.get(&outcome.ticket.id).is_some());
    assert_eq!(engine.open_tickets(10).len(), 1);
    Ok(())
}
