use chrono::{TimeZone, Utc};
use jal_domain::{AnomalyType, SensorId, SensorReading, Severity};
use jal_telemetry::AnomalyClassifier;
use proptest::prelude::*;

fn reading(pressure: f64, flow: f64) -> SensorReading {
    SensorReading {
        sensor_id: SensorId::from("S-prop"),
        pressure,
        flow,
        ph: None,
        turbidity: None,
        battery: None,
        timestamp: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
    }
}

proptest! {
    #[test]
    fn classification_is_consistent(
        pressure in 0.0..8.0_f64,
        flow in 0.0..500.0_f64,
        previous in proptest::option::of(0.0..8.0_f64),
    ) {
        let classifier = AnomalyClassifier::default();
        let prev = previous.map(|p| reading(p, 100.0));
        let c = classifier.classify(&reading(pressure, flow), prev.as_ref());

        prop_assert!((0.0..=1.0).contains(&c.confidence));
        prop_assert_eq!(c.is_anomalous(), c.anomaly_type != AnomalyType::Normal);
        prop_assert_eq!(c.severity == Severity::Critical, pressure < 1.5);
        if prev.is_none() {
            prop_assert_ne!(c.anomaly_type, AnomalyType::PressureSpike);
        }
    }
}
