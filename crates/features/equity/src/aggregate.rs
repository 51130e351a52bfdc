use chrono::{DateTime, Duration, Utc};
use fxhash::FxHashMap;
use jal_domain::config::EquityConfig;
use jal_domain::{SensorReading, Ward, WardId};
use jal_kernel::directory::{ComplaintStats, ReadingHistory, SensorDirectory, WardDirectory};
use serde::Serialize;
use std::sync::Arc;

/// One ward's inputs to equity scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardAggregate {
    pub ward: Ward,
    /// Mean pressure over the window, `None` without readings.
    pub avg_pressure: Option<f64>,
    pub reading_count: usize,
    /// Unresolved complaints filed within the complaint window.
    pub open_complaints: u32,
}

impl WardAggregate {
    /// Aggregate from this ward's readings in the window.
    #[must_use]
    pub fn from_readings<'a>(
        ward: Ward,
        readings: impl IntoIterator<Item = &'a SensorReading>,
        open_complaints: u32,
    ) -> Self {
        let (sum, count) = readings
            .into_iter()
            .fold((0.0, 0_usize), |(sum, count), r| (sum + r.pressure, count + 1));
        Self {
            ward,
            avg_pressure: (count > 0).then(|| sum / count as f64),
            reading_count: count,
            open_complaints,
        }
    }
}

/// City averages every ward is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CityBaseline {
    /// Mean of the wards' supply hours.
    pub avg_supply_hours: f64,
    /// Mean over every reading in the window, `None` without readings.
    pub avg_pressure: Option<f64>,
}

impl CityBaseline {
    /// Supply hours are averaged per ward. Pressure is weighted by reading
    /// count, which equals the mean over all readings in the window.
    #[must_use]
    pub fn from_aggregates(aggregates: &[WardAggregate]) -> Self {
        let avg_supply_hours = if aggregates.is_empty() {
            0.0
        } else {
            aggregates.iter().map(|a| a.ward.avg_supply_hours).sum::<f64>() / aggregates.len() as f64
        };

        let (weighted, readings) = aggregates.iter().fold((0.0, 0_usize), |(sum, n), a| {
            match a.avg_pressure {
                Some(p) => (sum + p * a.reading_count as f64, n + a.reading_count),
                None => (sum, n),
            }
        });

        Self {
            avg_supply_hours,
            avg_pressure: (readings > 0).then(|| weighted / readings as f64),
        }
    }
}

/// Builds per-ward aggregates from the collaborators.
#[derive(Debug, Clone)]
pub struct WardAggregator {
    wards: Arc<dyn WardDirectory>,
    sensors: Arc<dyn SensorDirectory>,
    readings: Arc<dyn ReadingHistory>,
    complaints: Arc<dyn ComplaintStats>,
    pressure_window: Duration,
    complaint_window: Duration,
}

impl WardAggregator {
    #[must_use]
    pub fn new(
        config: &EquityConfig,
        wards: Arc<dyn WardDirectory>,
        sensors: Arc<dyn SensorDirectory>,
        readings: Arc<dyn ReadingHistory>,
        complaints: Arc<dyn ComplaintStats>,
    ) -> Self {
        Self {
            wards,
            sensors,
            readings,
            complaints,
            pressure_window: Duration::try_hours(config.pressure_window_hours).unwrap_or(Duration::MAX),
            complaint_window: Duration::try_days(config.complaint_window_days).unwrap_or(Duration::MAX),
        }
    }

    #[must_use]
    pub fn ward(&self, id: WardId) -> Option<Ward> {
        self.wards.ward(id)
    }

    /// Aggregates for every registered ward, ordered by ward id.
    ///
    /// Readings from sensors with no ward mapping count toward no ward.
    #[must_use]
    pub fn aggregate_all(&self, now: DateTime<Utc>) -> Vec<WardAggregate> {
        let window = self.readings.readings_since(window_start(now, self.pressure_window));

        let mut ward_of = FxHashMap::default();
        let mut by_ward: FxHashMap<WardId, Vec<&SensorReading>> = FxHashMap::default();
        for reading in &window {
            let ward = *ward_of
                .entry(reading.sensor_id.clone())
                .or_insert_with(|| self.sensors.ward_of(&reading.sensor_id));
            if let Some(ward) = ward {
                by_ward.entry(ward).or_default().push(reading);
            }
        }

        let complaints_since = window_start(now, self.complaint_window);
        self.wards
            .wards()
            .into_iter()
            .map(|ward| {
                let open = self.complaints.unresolved_since(ward.id, complaints_since);
                let readings = by_ward.remove(&ward.id).unwrap_or_default();
                WardAggregate::from_readings(ward, readings, open)
            })
            .collect()
    }
}

/// Start of a lookback window, or the earliest representable time when the
/// window reaches past it.
fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jal_domain::SensorId;

    fn ward(id: u32, supply: f64) -> Ward {
        Ward {
            id: WardId(id),
            name: format!("Ward {id}"),
            population: 10_000,
            avg_supply_hours: supply,
            equity_score: 1.0,
        }
    }

    fn reading(pressure: f64) -> SensorReading {
        SensorReading {
            sensor_id: SensorId::from("S-1"),
            pressure,
            flow: 100.0,
            ph: None,
            turbidity: None,
            battery: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn baseline_pressure_is_weighted_by_readings() {
        let busy = WardAggregate::from_readings(
            ward(1, 6.0),
            &[reading(3.0), reading(3.0), reading(3.0)],
            0,
        );
        let quiet = WardAggregate::from_readings(ward(2, 10.0), &[reading(1.0)], 0);
        let silent = WardAggregate::from_readings(ward(3, 8.0), std::iter::empty(), 0);

        let baseline = CityBaseline::from_aggregates(&[busy, quiet, silent.clone()]);
        assert!((baseline.avg_supply_hours - 8.0).abs() < 1e-12);
        assert!((baseline.avg_pressure.unwrap() - 2.5).abs() < 1e-12);
        assert_eq!(silent.avg_pressure, None);
    }

    #[test]
    fn oversized_windows_reach_back_to_the_first_reading() {
        let start = window_start(Utc::now(), Duration::MAX);
        assert_eq!(start, DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn empty_city_has_zero_baseline() {
        let baseline = CityBaseline::from_aggregates(&[]);
        assert!(baseline.avg_supply_hours.abs() < f64::EPSILON);
        assert_eq!(baseline.avg_pressure, None);
    }
}
