//! Score to tier and SLA mapping.

use crate::PriorityError;
use jal_domain::PriorityTier;
use jal_domain::config::{MAX_HORIZON_HOURS, PriorityConfig};

/// Tier and SLA hours for `score`.
///
/// `score >= p1_threshold` is P1, `score >= p2_threshold` is P2, anything
/// lower is P3.
#[must_use]
pub const fn tier_for(score: u32, config: &PriorityConfig) -> (PriorityTier, u32) {
    if score >= config.p1_threshold {
        (PriorityTier::P1, config.p1_sla_hours)
    } else if score >= config.p2_threshold {
        (PriorityTier::P2, config.p2_sla_hours)
    } else {
        (PriorityTier::P3, config.p3_sla_hours)
    }
}

/// Rejects tierings where a more urgent tier would get a looser SLA or a
/// higher tier would be unreachable, and SLAs or lookback windows outside
/// `1..=MAX_HORIZON_HOURS`.
///
/// # Errors
/// Returns [`PriorityError::InvalidConfiguration`] describing the first problem found.
pub fn validate(config: &PriorityConfig) -> Result<(), PriorityError> {
    if config.p2_threshold > config.p1_threshold {
        return Err(PriorityError::InvalidConfiguration {
            message: format!(
                "p2_threshold ({}) exceeds p1_threshold ({})",
                config.p2_threshold, config.p1_threshold
            )
            .into(),
            context: None,
        });
    }
    if config.p1_sla_hours == 0
        || config.p1_sla_hours > config.p2_sla_hours
        || config.p2_sla_hours > config.p3_sla_hours
        || config.p3_sla_hours > MAX_HORIZON_HOURS
    {
        return Err(PriorityError::InvalidConfiguration {
            message: format!(
                "SLA hours must be positive, non-decreasing from P1 to P3 and at most {MAX_HORIZON_HOURS}, got {}/{}/{}",
                config.p1_sla_hours, config.p2_sla_hours, config.p3_sla_hours
            )
            .into(),
            context: None,
        });
    }
    if !(1..=i64::from(MAX_HORIZON_HOURS)).contains(&config.recent_window_hours) {
        return Err(PriorityError::InvalidConfiguration {
            message: format!(
                "recent_window_hours {} must lie in 1..={MAX_HORIZON_HOURS}",
                config.recent_window_hours
            )
            .into(),
            context: None,
        });
    }
    Ok(())
}
