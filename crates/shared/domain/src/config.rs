use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Upper bound for SLA hours and lookback windows, one leap year.
pub const MAX_HORIZON_HOURS: u32 = 24 * 366;

/// Every tunable of the decision engine. An empty source yields the defaults below.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfigInner {
    pub priority: PriorityConfig,
    pub anomaly: AnomalyConfig,
    pub leak: LeakConfig,
    pub equity: EquityConfig,
    pub log: LogConfig,
}

/// Arc-wrapped config, cheap to clone into each component.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(flatten, default)]
    inner: Arc<EngineConfigInner>,
}

impl Deref for EngineConfig {
    type Target = EngineConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for EngineConfig {
    fn deref_mut(&mut self) -> &mut EngineConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

impl From<EngineConfigInner> for EngineConfig {
    fn from(inner: EngineConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

/// Complaint scoring weights, thresholds and tiering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PriorityConfig {
    pub weights: PriorityWeights,
    pub keywords: KeywordConfig,
    /// Wards scoring below this are treated as underserved.
    pub low_equity_threshold: f64,
    pub high_population_threshold: u64,
    /// Points per unresolved complaint in the same ward.
    pub recent_complaint_points: u32,
    /// Maximum number of complaints counted.
    pub recent_complaint_cap: u32,
    pub recent_window_hours: i64,
    /// Correlated sensor pressure below this corroborates the complaint.
    pub sensor_pressure_threshold: f64,
    pub peak_windows: Vec<HourWindow>,
    /// Offset from UTC used to compute the local hour for peak windows.
    pub utc_offset_minutes: i32,
    pub p1_threshold: u32,
    pub p2_threshold: u32,
    pub p1_sla_hours: u32,
    pub p2_sla_hours: u32,
    pub p3_sla_hours: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    pub no_water: u32,
    pub low_pressure: u32,
    pub leak_report: u32,
    pub low_equity_ward: u32,
    pub high_population: u32,
    pub sensor_corroboration: u32,
    pub peak_hours: u32,
}

/// Case-insensitive phrases per keyword factor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub no_water: Vec<String>,
    pub low_pressure: Vec<String>,
    pub leak: Vec<String>,
}

/// Inclusive local-hour range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HourWindow {
    pub start: u32,
    pub end: u32,
}

impl HourWindow {
    #[must_use]
    pub const fn contains(self, hour: u32) -> bool {
        hour >= self.start && hour <= self.end
    }
}

/// Classification thresholds and sensor health limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub critical_pressure: f64,
    pub low_pressure: f64,
    pub spike_delta: f64,
    pub low_flow: f64,
    pub high_flow: f64,
    pub health: SensorHealthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorHealthConfig {
    pub offline_after_minutes: i64,
    pub stale_after_minutes: i64,
    pub low_battery: f64,
}

/// Leak synthesis policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeakConfig {
    /// At most one open leak ticket per sensor.
    pub dedupe_open_tickets: bool,
    /// Fraction of a day's flow assumed lost.
    pub loss_fraction: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
}

/// Equity scoring bounds and aggregation windows.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EquityConfig {
    pub pressure_window_hours: i64,
    pub complaint_window_days: i64,
    pub complaint_penalty_divisor: f64,
    pub complaint_penalty_floor: f64,
    pub min_score: f64,
    pub max_score: f64,
}

/// Logger settings consumed by the binaries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub name: String,
    pub level: String,
    pub filter: Option<String>,
    pub console: bool,
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub rotation: String,
    pub max_files: usize,
}

// --- Default ---

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            weights: PriorityWeights::default(),
            keywords: KeywordConfig::default(),
            low_equity_threshold: 0.8,
            high_population_threshold: 50_000,
            recent_complaint_points: 5,
            recent_complaint_cap: 5,
            recent_window_hours: 24,
            sensor_pressure_threshold: 1.5,
            peak_windows: vec![HourWindow { start: 6, end: 10 }, HourWindow { start: 18, end: 22 }],
            utc_offset_minutes: 0,
            p1_threshold: 25,
            p2_threshold: 15,
            p1_sla_hours: 4,
            p2_sla_hours: 12,
            p3_sla_hours: 48,
        }
    }
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            no_water: 15,
            low_pressure: 10,
            leak_report: 12,
            low_equity_ward: 7,
            high_population: 8,
            sensor_corroboration: 9,
            peak_hours: 4,
        }
    }
}

impl Default for KeywordConfig {
    fn default() -> Self {
        let phrases = |list: &[&str]| list.iter().map(|s| (*s).to_owned()).collect();
        Self {
            no_water: phrases(&["no water", "zero water"]),
            low_pressure: phrases(&["low pressure", "less pressure"]),
            leak: phrases(&["leak", "overflow"]),
        }
    }
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            critical_pressure: 1.5,
            low_pressure: 2.0,
            spike_delta: 1.0,
            low_flow: 50.0,
            high_flow: 300.0,
            health: SensorHealthConfig::default(),
        }
    }
}

impl Default for SensorHealthConfig {
    fn default() -> Self {
        Self { offline_after_minutes: 120, stale_after_minutes: 30, low_battery: 20.0 }
    }
}

impl Default for LeakConfig {
    fn default() -> Self {
        Self { dedupe_open_tickets: true, loss_fraction: 0.3, min_confidence: 0.85, max_confidence: 0.9 }
    }
}

impl Default for EquityConfig {
    fn default() -> Self {
        Self {
            pressure_window_hours: 24,
            complaint_window_days: 7,
            complaint_penalty_divisor: 100.0,
            complaint_penalty_floor: 0.7,
            min_score: 0.3,
            max_score: 2.0,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            name: "jalsetu".to_owned(),
            level: "info".to_owned(),
            filter: None,
            console: true,
            directory: None,
            json: false,
            rotation: "daily".to_owned(),
            max_files: 7,
        }
    }
}
