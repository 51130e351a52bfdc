use chrono::{DateTime, Duration, TimeZone, Utc};
use jal_domain::config::{AnomalyConfig, LeakConfig};
use jal_domain::{AnomalyType, PriorityTier, SensorId, Severity, TicketOrigin, WardId};
use jal_kernel::clock::FixedClock;
use jal_kernel::memory::InMemoryRegistry;
use jal_telemetry::health::SensorStatus;
use jal_telemetry::reading::RawReading;
use jal_telemetry::{TelemetryError, TelemetryMonitor};
use std::sync::Arc;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 14, 9, 30, 0).unwrap()
}

struct Fixture {
    monitor: TelemetryMonitor,
    clock: Arc<FixedClock>,
}

fn fixture(leak: LeakConfig) -> Fixture {
    let registry = InMemoryRegistry::new();
    registry.map_sensor("S-101", WardId(7)).unwrap();
    let clock = Arc::new(FixedClock::new(start()));
    let monitor = TelemetryMonitor::new(
        AnomalyConfig::default(),
        leak,
        25,
        4,
        Arc::new(registry),
        clock.clone(),
    )
    .unwrap();
    Fixture { monitor, clock }
}

#[test]
fn critical_drop_raises_one_leak_and_suppresses_the_repeat() -> Result<(), TelemetryError> {
    let Fixture { monitor, clock } = fixture(LeakConfig::default());

    let baseline = monitor.ingest(RawReading::new("S-101", 2.0, 120.0))?;
    assert_eq!(baseline.alert.anomaly_type, AnomalyType::Normal);

    let critical = monitor.ingest(RawReading::new("S-101", 1.2, 120.0))?;
    assert_eq!(critical.alert.anomaly_type, AnomalyType::CriticalLowPressure);
    assert_eq!(critical.alert.severity, Severity::Critical);
    assert!((critical.alert.confidence - 0.9).abs() < f64::EPSILON);

    let detection = critical.leak.expect("first critical reading raises a leak");
    assert_eq!(detection.event.ward_id, Some(WardId(7)));
    assert_eq!(detection.ticket.tier, PriorityTier::P1);
    assert_eq!(detection.ticket.origin, TicketOrigin::LeakEvent(detection.event.id.clone()));
    assert_eq!(
        monitor.table().open_leak_ticket(&SensorId::from("S-101")),
        Some(detection.ticket.id.clone())
    );

    clock.advance(Duration::seconds(30));
    let repeat = monitor.ingest(RawReading::new("S-101", 1.1, 118.0))?;
    assert_eq!(repeat.alert.anomaly_type, AnomalyType::CriticalLowPressure);
    assert!(repeat.leak.is_none());
    assert!(repeat.suppressed_duplicate);
    Ok(())
}

#[test]
fn resolving_the_ticket_rearms_the_sensor() -> Result<(), TelemetryError> {
    let Fixture { monitor, .. } = fixture(LeakConfig::default());

    let first = monitor.ingest(RawReading::new("S-101", 1.0, 90.0))?.leak.unwrap();
    assert_eq!(monitor.resolve_leak_ticket(&first.ticket.id), Some(SensorId::from("S-101")));
    assert_eq!(monitor.table().open_leak_ticket(&SensorId::from("S-101")), None);

    let second = monitor.ingest(RawReading::new("S-101", 1.0, 90.0))?.leak.unwrap();
    assert_ne!(first.ticket.id, second.ticket.id);
    Ok(())
}

#[test]
fn dedupe_can_be_switched_off() -> Result<(), TelemetryError> {
    let Fixture { monitor, .. } =
        fixture(LeakConfig { dedupe_open_tickets: false, ..LeakConfig::default() });

    let first = monitor.ingest(RawReading::new("S-101", 1.2, 100.0))?;
    let second = monitor.ingest(RawReading::new("S-101", 1.1, 100.0))?;
    assert!(first.leak.is_some());
    assert!(second.leak.is_some());
    assert!(!second.suppressed_duplicate);
    Ok(())
}

#[test]
fn malformed_reading_leaves_state_untouched() -> Result<(), TelemetryError> {
    let Fixture { monitor, .. } = fixture(LeakConfig::default());
    monitor.ingest(RawReading::new("S-101", 3.0, 150.0))?;

    let broken = RawReading { pressure: None, ..RawReading::new("S-101", 0.0, 150.0) };
    let err = monitor.ingest(broken).unwrap_err();
    assert_eq!(err.kind(), "malformed_reading");

    let last = monitor.table().last_reading(&SensorId::from("S-101")).unwrap();
    assert!((last.pressure - 3.0).abs() < f64::EPSILON);

    let unknown = RawReading { flow: None, ..RawReading::new("S-999", 2.0, 0.0) };
    assert!(monitor.ingest(unknown).is_err());
    assert_eq!(monitor.table().last_reading(&SensorId::from("S-999")), None);
    Ok(())
}

#[test]
fn spike_needs_a_previous_reading() -> Result<(), TelemetryError> {
    let Fixture { monitor, .. } = fixture(LeakConfig::default());

    let first = monitor.ingest(RawReading::new("S-101", 4.5, 150.0))?;
    assert_eq!(first.alert.anomaly_type, AnomalyType::Normal);

    let second = monitor.ingest(RawReading::new("S-101", 3.0, 150.0))?;
    assert_eq!(second.alert.anomaly_type, AnomalyType::PressureSpike);
    Ok(())
}

#[test]
fn batch_keeps_going_past_bad_readings() {
    let Fixture { monitor, .. } = fixture(LeakConfig::default());

    let report = monitor.ingest_batch([
        RawReading::new("S-101", 2.5, 120.0),
        RawReading { flow: None, ..RawReading::new("S-102", 2.5, 0.0) },
        RawReading::new("S-102", 2.6, 20.0),
    ]);

    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].index, 1);
    assert_eq!(report.succeeded[1].alert.anomaly_type, AnomalyType::LowFlow);
}

#[test]
fn concurrent_critical_readings_raise_a_single_ticket() {
    let Fixture { monitor, .. } = fixture(LeakConfig::default());

    let leaks: usize = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let monitor = &monitor;
                scope.spawn(move || {
                    let pressure = 1.0 + f64::from(i) * 0.01;
                    monitor
                        .ingest(RawReading::new("S-101", pressure, 100.0))
                        .map(|outcome| usize::from(outcome.leak.is_some()))
                        .unwrap_or(0)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert_eq!(leaks, 1);
}

#[test]
fn health_tracks_silence_and_battery() -> Result<(), TelemetryError> {
    let Fixture { monitor, clock } = fixture(LeakConfig::default());

    monitor.ingest(RawReading::new("S-101", 3.0, 150.0).at(start()))?;
    monitor.ingest(RawReading::new("S-102", 3.0, 150.0).at(start()).with_battery(12.0))?;
    assert_eq!(monitor.sensor_health(&SensorId::from("S-101")).status, SensorStatus::Healthy);
    assert_eq!(monitor.sensor_health(&SensorId::from("S-102")).status, SensorStatus::LowBattery);
    assert_eq!(monitor.sensor_health(&SensorId::from("S-404")).status, SensorStatus::Offline);

    clock.advance(Duration::hours(3));
    let fleet = monitor.fleet_health();
    assert_eq!(fleet.len(), 2);
    assert!(fleet.iter().all(|h| h.status == SensorStatus::Offline));
    assert_eq!(fleet[0].sensor_id, SensorId::from("S-101"));
    Ok(())
}

#[test]
fn inverted_thresholds_are_rejected() {
    let anomaly = AnomalyConfig { critical_pressure: 2.5, ..AnomalyConfig::default() };
    let err = TelemetryMonitor::new(
        anomaly,
        LeakConfig::default(),
        25,
        4,
        Arc::new(InMemoryRegistry::new()),
        Arc::new(FixedClock::new(start())),
    )
    .unwrap_err();
    assert_eq!(err.kind(), "invalid_configuration");
}
