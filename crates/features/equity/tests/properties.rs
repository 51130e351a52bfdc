use jal_domain::config::EquityConfig;
use jal_domain::{Ward, WardId};
use jal_equity::inequality::gini;
use jal_equity::{CityBaseline, EquityScorer, WardAggregate, WardAggregator};
use jal_kernel::clock::SystemClock;
use jal_kernel::memory::{InMemoryComplaintLog, InMemoryReadingLog, InMemoryRegistry};
use proptest::prelude::*;
use std::sync::Arc;

fn scorer() -> EquityScorer {
    let config = EquityConfig::default();
    let registry = Arc::new(InMemoryRegistry::new());
    let aggregator = WardAggregator::new(
        &config,
        registry.clone(),
        registry,
        Arc::new(InMemoryReadingLog::default()),
        Arc::new(InMemoryComplaintLog::new()),
    );
    EquityScorer::new(config, aggregator, Arc::new(SystemClock)).unwrap()
}

fn non_negative() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), 0.0..50.0_f64]
}

proptest! {
    #[test]
    fn score_stays_in_bounds(
        supply in non_negative(),
        city_supply in non_negative(),
        pressure in proptest::option::of(non_negative()),
        city_pressure in proptest::option::of(non_negative()),
        complaints in 0..1_000_u32,
    ) {
        let aggregate = WardAggregate {
            ward: Ward {
                id: WardId(1),
                name: "Pimpri".to_owned(),
                population: 1,
                avg_supply_hours: supply,
                equity_score: 1.0,
            },
            avg_pressure: pressure,
            reading_count: usize::from(pressure.is_some()),
            open_complaints: complaints,
        };
        let baseline = CityBaseline { avg_supply_hours: city_supply, avg_pressure: city_pressure };

        let snapshot = scorer().score(&aggregate, &baseline, chrono::Utc::now());
        prop_assert!((0.3..=2.0).contains(&snapshot.score), "score {}", snapshot.score);
    }

    #[test]
    fn equal_scores_have_zero_gini(value in 0.3..2.0_f64, n in 1..40_usize) {
        prop_assert!(gini(&vec![value; n]).abs() < 1e-9);
    }

    #[test]
    fn gini_is_bounded(values in proptest::collection::vec(0.3..2.0_f64, 0..40)) {
        let g = gini(&values);
        prop_assert!((0.0..1.0).contains(&(g + 1e-12)));
    }
}
