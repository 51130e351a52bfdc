use chrono::{DateTime, Duration, TimeZone, Utc};
use jal_domain::{Complaint, ComplaintId, ComplaintStatus, SensorId, SensorReading, Ward, WardId};
use jal_kernel::KernelError;
use jal_kernel::directory::{ComplaintLog, ComplaintStats, ReadingHistory, SensorDirectory, WardDirectory};
use jal_kernel::memory::{InMemoryComplaintLog, InMemoryReadingLog, InMemoryRegistry};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap()
}

fn ward(id: u32, name: &str) -> Ward {
    Ward {
        id: WardId(id),
        name: name.to_owned(),
        population: 40_000,
        avg_supply_hours: 6.0,
        equity_score: 1.0,
    }
}

fn complaint(id: u64, ward: u32, hours_ago: i64, status: ComplaintStatus) -> Complaint {
    Complaint {
        id: ComplaintId(id),
        ward_id: Some(WardId(ward)),
        issue: "no water".to_owned(),
        location: None,
        created_at: t0() - Duration::hours(hours_ago),
        status,
    }
}

fn reading(sensor: &str, minutes: i64, pressure: f64) -> SensorReading {
    SensorReading {
        sensor_id: SensorId::from(sensor),
        pressure,
        flow: 120.0,
        ph: None,
        turbidity: None,
        battery: Some(80.0),
        timestamp: t0() + Duration::minutes(minutes),
    }
}

#[test]
fn registry_lists_wards_in_id_order_and_maps_sensors() {
    let registry = InMemoryRegistry::with_wards([ward(3, "Kothrud"), ward(1, "Aundh")]);
    registry.map_sensor("S-1", WardId(1)).unwrap();
    registry.map_sensor("S-2", WardId(1)).unwrap();

    let ids: Vec<_> = registry.wards().iter().map(|w| w.id).collect();
    assert_eq!(ids, [WardId(1), WardId(3)]);
    assert_eq!(registry.ward_of(&SensorId::from("S-2")), Some(WardId(1)));
    assert_eq!(registry.sensors_in(WardId(1)), [SensorId::from("S-1"), SensorId::from("S-2")]);
    assert!(registry.sensors_in(WardId(3)).is_empty());
}

#[test]
fn registry_rejects_unknown_wards() {
    let registry = InMemoryRegistry::new();
    let err = registry.map_sensor("S-1", WardId(9)).unwrap_err();
    assert!(matches!(err, KernelError::UnknownWard { .. }));
    assert!(registry.set_equity_score(WardId(9), 0.5).is_err());
}

#[test]
fn equity_score_cache_is_updated() {
    let registry = InMemoryRegistry::with_wards([ward(1, "Aundh")]);
    registry.set_equity_score(WardId(1), 0.62).unwrap();
    assert!((registry.ward(WardId(1)).unwrap().equity_score - 0.62).abs() < f64::EPSILON);
}

#[test]
fn unresolved_counts_respect_window_ward_and_status() {
    let log = InMemoryComplaintLog::new();
    log.record(complaint(1, 1, 2, ComplaintStatus::Pending));
    log.record(complaint(2, 1, 5, ComplaintStatus::InProgress));
    log.record(complaint(3, 1, 3, ComplaintStatus::Resolved));
    log.record(complaint(4, 1, 30, ComplaintStatus::Pending));
    log.record(complaint(5, 2, 1, ComplaintStatus::Pending));

    assert_eq!(log.unresolved_since(WardId(1), t0() - Duration::hours(24)), 2);

    log.set_status(ComplaintId(1), ComplaintStatus::Resolved).unwrap();
    assert_eq!(log.unresolved_since(WardId(1), t0() - Duration::hours(24)), 1);
    assert!(log.set_status(ComplaintId(99), ComplaintStatus::Resolved).is_err());
}

#[test]
fn reading_log_keeps_order_and_prunes_by_retention() {
    let log = InMemoryReadingLog::with_retention(Duration::hours(1));
    log.record(&reading("S-1", 10, 2.5));
    log.record(&reading("S-1", 0, 2.4));
    log.record(&reading("S-2", 30, 3.1));

    let all = log.readings_since(t0());
    let minutes: Vec<_> = all.iter().map(|r| (r.timestamp - t0()).num_minutes()).collect();
    assert_eq!(minutes, [0, 10, 30]);

    log.record(&reading("S-2", 75, 3.0));
    assert_eq!(log.len(), 2, "readings before minute 15 fall outside the hour");
    assert_eq!(log.readings_since(t0() + Duration::minutes(30)).len(), 2);
}

#[test]
fn complaint_log_works_through_the_trait_object() -> Result<(), KernelError> {
    let log: std::sync::Arc<dyn ComplaintLog> = std::sync::Arc::new(InMemoryComplaintLog::new());
    log.record(complaint(40, 3, 1, ComplaintStatus::Pending));
    assert_eq!(log.unresolved_since(WardId(3), t0() - Duration::days(1)), 1);

    log.set_status(ComplaintId(40), ComplaintStatus::Resolved)?;
    assert_eq!(log.complaint(ComplaintId(40)).map(|c| c.status), Some(ComplaintStatus::Resolved));
    assert_eq!(log.unresolved_since(WardId(3), t0() - Duration::days(1)), 0);
    assert!(log.set_status(ComplaintId(41), ComplaintStatus::Resolved).is_err());
    Ok(())
}
