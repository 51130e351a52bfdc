//! Summary statistics over a window of readings.

use jal_domain::SensorReading;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReadingStats {
    pub count: usize,
    pub avg_pressure: f64,
    pub avg_flow: f64,
    pub min_pressure: f64,
    pub max_pressure: f64,
}

impl ReadingStats {
    /// `None` for an empty window.
    pub fn from_readings<'a>(readings: impl IntoIterator<Item = &'a SensorReading>) -> Option<Self> {
        let mut count = 0_usize;
        let mut pressure_sum = 0.0;
        let mut flow_sum = 0.0;
        let mut min_pressure = f64::INFINITY;
        let mut max_pressure = f64::NEG_INFINITY;

        for reading in readings {
            count += 1;
            pressure_sum += reading.pressure;
            flow_sum += reading.flow;
            min_pressure = min_pressure.min(reading.pressure);
            max_pressure = max_pressure.max(reading.pressure);
        }

        (count > 0).then(|| Self {
            count,
            avg_pressure: pressure_sum / count as f64,
            avg_flow: flow_sum / count as f64,
            min_pressure,
            max_pressure,
        })
    }
}
