use crate::aggregate::{CityBaseline, WardAggregate, WardAggregator};
use crate::{EquityError, inequality};
use chrono::{DateTime, Utc};
use jal_domain::config::{EquityConfig, MAX_HORIZON_HOURS};
use jal_domain::{CitywideEquityReport, EquityLevel, EquityMetrics, EquitySnapshot, WardId};
use jal_kernel::clock::Clock;
use std::sync::Arc;
use tracing::debug;

const NEUTRAL: f64 = 1.0;

/// Band for an unrounded, clamped score.
#[must_use]
pub fn level_for(score: f64) -> EquityLevel {
    if score >= 1.3 {
        EquityLevel::Excellent
    } else if score >= 0.9 {
        EquityLevel::Fair
    } else if score >= 0.6 {
        EquityLevel::Moderate
    } else {
        EquityLevel::Poor
    }
}

fn recommendations(level: EquityLevel, ward_name: &str) -> Vec<String> {
    match level {
        EquityLevel::Poor => vec![
            format!("Priority intervention needed in {ward_name}"),
            "Consider increasing supply hours during peak demand".to_owned(),
            "Install additional pressure monitoring sensors".to_owned(),
            "Schedule pipe network inspection for leaks".to_owned(),
        ],
        EquityLevel::Moderate => vec![
            format!("Monitor water distribution in {ward_name}"),
            "Optimize supply timing based on consumption patterns".to_owned(),
            "Engage with community for feedback".to_owned(),
        ],
        EquityLevel::Fair => vec![
            format!("Maintain current service levels in {ward_name}"),
            "Continue regular monitoring".to_owned(),
        ],
        EquityLevel::Excellent => vec![
            format!("Share best practices from {ward_name} with other wards"),
            "Consider redistributing excess to underserved areas".to_owned(),
        ],
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Ward value over city value, or `1.0` when the city value cannot divide.
fn ratio(ward: WardId, name: &'static str, value: f64, baseline: f64) -> f64 {
    let ratio = value / baseline;
    if baseline.abs() < f64::EPSILON || !ratio.is_finite() {
        debug!(ward_id = %ward, factor = name, value, baseline, "Zero baseline, using neutral ratio");
        return NEUTRAL;
    }
    ratio
}

/// Scores wards against the city baseline.
#[derive(Debug, Clone)]
pub struct EquityScorer {
    config: EquityConfig,
    aggregator: WardAggregator,
    clock: Arc<dyn Clock>,
}

impl EquityScorer {
    /// # Errors
    /// Returns [`EquityError::InvalidConfiguration`] for an empty score
    /// range, a non-positive complaint divisor, a penalty floor outside
    /// `[0, 1]` or a window outside one year.
    pub fn new(
        config: EquityConfig,
        aggregator: WardAggregator,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EquityError> {
        validate_config(&config)?;
        Ok(Self { config, aggregator, clock })
    }

    #[must_use]
    pub const fn config(&self) -> &EquityConfig {
        &self.config
    }

    /// Raw score before clamping and rounding. Non-finite results collapse
    /// to the neutral score.
    #[must_use]
    pub fn raw_score(&self, aggregate: &WardAggregate, baseline: &CityBaseline) -> f64 {
        let ward = aggregate.ward.id;
        let mut score = NEUTRAL;

        score *= ratio(ward, "supply_hours", aggregate.ward.avg_supply_hours, baseline.avg_supply_hours);

        if let Some(pressure) = aggregate.avg_pressure {
            let city = baseline.avg_pressure.unwrap_or(0.0);
            score *= ratio(ward, "pressure", pressure, city);
        }

        let penalty = 1.0 - f64::from(aggregate.open_complaints) / self.config.complaint_penalty_divisor;
        score *= penalty.max(self.config.complaint_penalty_floor);

        if score.is_finite() { score } else { NEUTRAL }
    }

    /// Scores one ward. Pure apart from the timestamp.
    #[must_use]
    pub fn score(
        &self,
        aggregate: &WardAggregate,
        baseline: &CityBaseline,
        now: DateTime<Utc>,
    ) -> EquitySnapshot {
        let clamped =
            self.raw_score(aggregate, baseline).clamp(self.config.min_score, self.config.max_score);
        let level = level_for(clamped);
        let ward = &aggregate.ward;

        EquitySnapshot {
            ward_id: ward.id,
            ward_name: ward.name.clone(),
            score: round_to(clamped, 2),
            level,
            color: level.color().to_owned(),
            description: level.description().to_owned(),
            metrics: EquityMetrics {
                supply_hours: ward.avg_supply_hours,
                city_avg_supply_hours: round_to(baseline.avg_supply_hours, 1),
                avg_pressure: aggregate.avg_pressure.map(|p| round_to(p, 2)),
                city_avg_pressure: baseline.avg_pressure.map(|p| round_to(p, 2)),
                open_complaints: aggregate.open_complaints,
            },
            recommendations: recommendations(level, &ward.name),
            computed_at: now,
        }
    }

    /// Every ward scored against one shared baseline, ordered by ward id.
    #[must_use]
    pub fn score_all(&self, aggregates: &[WardAggregate], now: DateTime<Utc>) -> Vec<EquitySnapshot> {
        let baseline = CityBaseline::from_aggregates(aggregates);
        aggregates.iter().map(|a| self.score(a, &baseline, now)).collect()
    }

    /// # Errors
    /// Returns [`EquityError::UnknownWard`] when the registry has no such ward.
    pub fn ward_equity(&self, ward_id: WardId) -> Result<EquitySnapshot, EquityError> {
        let now = self.clock.now();
        let aggregates = self.aggregator.aggregate_all(now);
        let baseline = CityBaseline::from_aggregates(&aggregates);

        let aggregate = aggregates.iter().find(|a| a.ward.id == ward_id).ok_or_else(|| {
            EquityError::UnknownWard {
                message: format!("ward {ward_id} is not registered").into(),
                context: None,
            }
        })?;

        let snapshot = self.score(aggregate, &baseline, now);
        debug!(
            ward_id = %ward_id,
            score = snapshot.score,
            level = ?snapshot.level,
            "Ward equity computed"
        );
        Ok(snapshot)
    }

    #[must_use]
    pub fn citywide(&self) -> CitywideEquityReport {
        let now = self.clock.now();
        let snapshots = self.score_all(&self.aggregator.aggregate_all(now), now);
        inequality::citywide_report(snapshots, now)
    }
}

/// Checks an equity section before anything is built from it.
///
/// # Errors
/// Returns [`EquityError::InvalidConfiguration`] describing the first problem found.
pub fn validate_config(config: &EquityConfig) -> Result<(), EquityError> {
    let max_hours = i64::from(MAX_HORIZON_HOURS);
    let problem = if !(config.min_score.is_finite() && config.max_score.is_finite())
        || config.min_score > config.max_score
    {
        Some(format!("score range {}..{} is empty", config.min_score, config.max_score))
    } else if !(config.complaint_penalty_divisor.is_finite() && config.complaint_penalty_divisor > 0.0) {
        Some(format!(
            "complaint_penalty_divisor {} must be positive",
            config.complaint_penalty_divisor
        ))
    } else if !(0.0..=1.0).contains(&config.complaint_penalty_floor) {
        Some(format!(
            "complaint_penalty_floor {} must lie in [0, 1]",
            config.complaint_penalty_floor
        ))
    } else if !(1..=max_hours).contains(&config.pressure_window_hours)
        || !(1..=max_hours / 24).contains(&config.complaint_window_days)
    {
        Some(format!(
            "aggregation windows {}h/{}d must be positive and at most {max_hours}h",
            config.pressure_window_hours, config.complaint_window_days
        ))
    } else {
        None
    };

    match problem {
        Some(message) => {
            Err(EquityError::InvalidConfiguration { message: message.into(), context: None })
        },
        None => Ok(()),
    }
}
