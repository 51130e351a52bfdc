use chrono::{DateTime, Duration, TimeZone, Utc};
use jal_domain::config::EquityConfig;
use jal_domain::{
    CityStatus, Complaint, ComplaintId, ComplaintStatus, EquityLevel, EquityMetrics,
    EquitySnapshot, SensorId, SensorReading, Ward, WardId,
};
use jal_equity::inequality::citywide_report;
use jal_equity::{EquityError, EquityScorer, WardAggregator};
use jal_kernel::clock::FixedClock;
use jal_kernel::directory::ReadingHistory;
use jal_kernel::memory::{InMemoryComplaintLog, InMemoryReadingLog, InMemoryRegistry};
use std::sync::Arc;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap()
}

fn ward(id: u32, name: &str, supply: f64) -> Ward {
    Ward {
        id: WardId(id),
        name: name.to_owned(),
        population: 40_000,
        avg_supply_hours: supply,
        equity_score: 1.0,
    }
}

fn reading(sensor: &str, pressure: f64, hours_ago: i64) -> SensorReading {
    SensorReading {
        sensor_id: SensorId::from(sensor),
        pressure,
        flow: 120.0,
        ph: None,
        turbidity: None,
        battery: None,
        timestamp: now() - Duration::hours(hours_ago),
    }
}

fn complaint(id: u64, ward: u32, days_ago: i64, status: ComplaintStatus) -> Complaint {
    Complaint {
        id: ComplaintId(id),
        ward_id: Some(WardId(ward)),
        issue: "low pressure".to_owned(),
        location: None,
        created_at: now() - Duration::days(days_ago),
        status,
    }
}

fn scorer() -> EquityScorer {
    let registry = Arc::new(InMemoryRegistry::with_wards([
        ward(1, "Aundh", 8.0),
        ward(2, "Hadapsar", 4.0),
        ward(3, "Wakad", 12.0),
    ]));
    registry.map_sensor("S-1", WardId(1)).unwrap();
    registry.map_sensor("S-2", WardId(2)).unwrap();

    let readings = Arc::new(InMemoryReadingLog::default());
    for r in [
        reading("S-2", 0.1, 30),
        reading("S-1", 3.0, 5),
        reading("S-2", 1.5, 3),
        reading("S-3", 9.0, 2),
        reading("S-1", 3.0, 1),
    ] {
        readings.record(&r);
    }

    let complaints = Arc::new(InMemoryComplaintLog::new());
    for id in 0..10 {
        complaints.record(complaint(id, 2, 1, ComplaintStatus::Pending));
    }
    complaints.record(complaint(10, 2, 2, ComplaintStatus::Resolved));
    complaints.record(complaint(11, 2, 9, ComplaintStatus::Pending));

    let config = EquityConfig::default();
    let aggregator =
        WardAggregator::new(&config, registry.clone(), registry, readings, complaints);
    EquityScorer::new(config, aggregator, Arc::new(FixedClock::new(now()))).unwrap()
}

#[test]
fn wards_are_scored_against_the_shared_baseline() -> Result<(), EquityError> {
    let scorer = scorer();

    // 8/8 * 3.0/2.5
    let aundh = scorer.ward_equity(WardId(1))?;
    assert!((aundh.score - 1.2).abs() < f64::EPSILON);
    assert_eq!(aundh.level, EquityLevel::Fair);
    assert_eq!(aundh.metrics.city_avg_pressure, Some(2.5));

    // 4/8 * 1.5/2.5 * 0.9 = 0.27, clamped
    let hadapsar = scorer.ward_equity(WardId(2))?;
    assert!((hadapsar.score - 0.3).abs() < f64::EPSILON);
    assert_eq!(hadapsar.level, EquityLevel::Poor);
    assert_eq!(hadapsar.metrics.open_complaints, 10);

    // no readings, supply ratio only
    let wakad = scorer.ward_equity(WardId(3))?;
    assert!((wakad.score - 1.5).abs() < f64::EPSILON);
    assert_eq!(wakad.metrics.avg_pressure, None);
    assert_eq!(wakad.recommendations[0], "Share best practices from Wakad with other wards");
    Ok(())
}

#[test]
fn unknown_ward_is_an_error() {
    let err = scorer().ward_equity(WardId(99)).unwrap_err();
    assert_eq!(err.kind(), "unknown_ward");
}

#[test]
fn citywide_report_lists_worst_ward_first() {
    let report = scorer().citywide();

    let order: Vec<WardId> = report.wards.iter().map(|w| w.ward_id).collect();
    assert_eq!(order, [WardId(2), WardId(1), WardId(3)]);
    assert_eq!(report.ward_count, 3);
    assert!((report.mean_score - 1.0).abs() < f64::EPSILON);
    // (-2*0.3 + 2*1.5) / (3 * 3.0)
    assert!((report.gini - 0.267).abs() < 1e-9);
    assert_eq!(report.status, CityStatus::ModerateInequality);
    assert_eq!(report.action, "Targeted improvements needed in low-scoring wards");
}

fn snapshot(id: u32, score: f64) -> EquitySnapshot {
    let level = jal_equity::level_for(score);
    EquitySnapshot {
        ward_id: WardId(id),
        ward_name: format!("Ward {id}"),
        score,
        level,
        color: level.color().to_owned(),
        description: level.description().to_owned(),
        metrics: EquityMetrics {
            supply_hours: 8.0,
            city_avg_supply_hours: 8.0,
            avg_pressure: None,
            city_avg_pressure: None,
            open_complaints: 0,
        },
        recommendations: Vec::new(),
        computed_at: now(),
    }
}

#[test]
fn three_ward_spread_is_moderate() {
    let report =
        citywide_report(vec![snapshot(1, 1.5), snapshot(2, 0.5), snapshot(3, 1.0)], now());

    assert!((report.mean_score - 1.0).abs() < f64::EPSILON);
    assert!((report.gini - 0.222).abs() < 1e-9);
    assert_eq!(report.status, CityStatus::ModerateInequality);
    assert_eq!(report.wards[0].ward_id, WardId(2));
}

#[test]
fn report_serializes_with_snake_case_fields() {
    let report = citywide_report(vec![snapshot(1, 1.0)], now());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["status"], "GOOD_EQUITY");
    assert_eq!(json["ward_count"], 1);
    assert_eq!(json["wards"][0]["level"], "FAIR");
    assert!(json["wards"][0]["metrics"]["city_avg_supply_hours"].is_number());
}
