use crate::matcher::{IssueMatcher, IssueSignal};
use crate::tier::{tier_for, validate};
use crate::{PriorityError, PriorityErrorExt};
use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};
use jal_domain::config::PriorityConfig;
use jal_domain::{
    Complaint, Degradation, Factor, FactorHit, PriorityTier, SensorReading, TicketId,
    TicketOrigin, TicketRequest, Ward,
};
use jal_kernel::batch::BatchReport;
use jal_kernel::clock::Clock;
use jal_kernel::directory::{ComplaintStats, WardDirectory};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Scored complaint, before it becomes a ticket request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityAssessment {
    pub score: u32,
    pub tier: PriorityTier,
    pub sla_hours: u32,
    pub assessed_at: DateTime<Utc>,
    pub sla_deadline: DateTime<Utc>,
    /// Triggered factors in evaluation order.
    pub factors: Vec<FactorHit>,
    pub degradations: Vec<Degradation>,
}

impl PriorityAssessment {
    #[must_use]
    pub fn into_ticket(self, id: TicketId, origin: TicketOrigin) -> TicketRequest {
        TicketRequest {
            id,
            origin,
            tier: self.tier,
            score: self.score,
            sla_hours: self.sla_hours,
            created_at: self.assessed_at,
            sla_deadline: self.sla_deadline,
            factors: self.factors,
        }
    }
}

/// Additive complaint scorer. Stateless apart from its injected collaborators.
#[derive(Debug)]
pub struct PriorityScorer {
    config: PriorityConfig,
    local_offset: FixedOffset,
    clock: Arc<dyn Clock>,
    wards: Arc<dyn WardDirectory>,
    complaints: Arc<dyn ComplaintStats>,
    matcher: Arc<dyn IssueMatcher>,
}

impl PriorityScorer {
    /// # Errors
    /// Returns [`PriorityError::InvalidConfiguration`] for inconsistent tiers
    /// or an out-of-range UTC offset.
    pub fn new(
        config: PriorityConfig,
        clock: Arc<dyn Clock>,
        wards: Arc<dyn WardDirectory>,
        complaints: Arc<dyn ComplaintStats>,
        matcher: Arc<dyn IssueMatcher>,
    ) -> Result<Self, PriorityError> {
        validate(&config)?;
        let local_offset = config
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| PriorityError::InvalidConfiguration {
                message: format!("utc_offset_minutes {} is out of range", config.utc_offset_minutes)
                    .into(),
                context: None,
            })?;

        Ok(Self { config, local_offset, clock, wards, complaints, matcher })
    }

    #[must_use]
    pub const fn config(&self) -> &PriorityConfig {
        &self.config
    }

    /// Scores `complaint` at the clock's current time.
    ///
    /// `correlated` is the most relevant recent reading near the complaint,
    /// if the caller has one.
    ///
    /// # Errors
    /// Returns [`PriorityError::ComplaintResolved`] for resolved complaints.
    pub fn assess(
        &self,
        complaint: &Complaint,
        correlated: Option<&SensorReading>,
    ) -> Result<PriorityAssessment, PriorityError> {
        if !complaint.status.is_unresolved() {
            return Err(PriorityError::ComplaintResolved {
                message: complaint.id.to_string().into(),
                context: None,
            });
        }

        let now = self.clock.now();
        let mut degradations = Vec::new();
        let ward = complaint.ward_id.and_then(|id| {
            let ward = self.wards.ward(id);
            if ward.is_none() {
                degradations.push(Degradation::UnknownWard { ward_id: id });
            }
            ward
        });

        let mut factors = self.keyword_factors(&complaint.issue);
        if let Some(ward) = &ward {
            factors.extend(self.ward_factors(ward, now));
        }
        if let Some(reading) = correlated
            && reading.pressure < self.config.sensor_pressure_threshold
        {
            factors.push(FactorHit::new(
                Factor::SensorCorroboration,
                self.config.weights.sensor_corroboration,
                format!("Sensor confirms low pressure: {} bar", reading.pressure),
            ));
        }
        if self.is_peak(now) {
            factors.push(FactorHit::new(
                Factor::PeakHours,
                self.config.weights.peak_hours,
                "Peak usage time",
            ));
        }

        let score = factors.iter().fold(0_u32, |acc, hit| acc.saturating_add(hit.points));
        let (tier, sla_hours) = tier_for(score, &self.config);
        let sla_deadline = now + Duration::hours(i64::from(sla_hours));

        debug!(
            complaint_id = %complaint.id,
            score,
            tier = %tier,
            factors = factors.len(),
            degraded = !degradations.is_empty(),
            "Complaint scored"
        );

        Ok(PriorityAssessment {
            score,
            tier,
            sla_hours,
            assessed_at: now,
            sla_deadline,
            factors,
            degradations,
        })
    }

    /// Scores every complaint independently. One failure never affects another.
    pub fn score_batch<'a, I>(&self, items: I) -> BatchReport<PriorityAssessment, PriorityError>
    where
        I: IntoIterator<Item = (&'a Complaint, Option<&'a SensorReading>)>,
    {
        BatchReport::collect(items, |(complaint, reading)| {
            self.assess(complaint, reading)
                .context(format!("scoring complaint {}", complaint.id))
        })
    }

    fn keyword_factors(&self, issue: &str) -> Vec<FactorHit> {
        let weights = &self.config.weights;
        IssueSignal::ALL
            .into_iter()
            .filter(|signal| self.matcher.matches(issue, *signal))
            .map(|signal| match signal {
                IssueSignal::NoWater => {
                    FactorHit::new(Factor::NoWater, weights.no_water, "No water situation")
                },
                IssueSignal::LowPressure => FactorHit::new(
                    Factor::LowPressure,
                    weights.low_pressure,
                    "Low pressure complaint",
                ),
                IssueSignal::Leak => {
                    FactorHit::new(Factor::LeakReport, weights.leak_report, "Leak reported")
                },
            })
            .collect()
    }

    fn ward_factors(&self, ward: &Ward, now: DateTime<Utc>) -> Vec<FactorHit> {
        let mut hits = Vec::new();

        if ward.equity_score < self.config.low_equity_threshold {
            hits.push(FactorHit::new(
                Factor::LowEquityWard,
                self.config.weights.low_equity_ward,
                format!("Underserved ward: {}", ward.name),
            ));
        }
        if ward.population > self.config.high_population_threshold {
            hits.push(FactorHit::new(
                Factor::HighPopulation,
                self.config.weights.high_population,
                "High population area",
            ));
        }

        let since = now - Duration::hours(self.config.recent_window_hours);
        let recent = self.complaints.unresolved_since(ward.id, since);
        if recent > 0 {
            let counted = recent.min(self.config.recent_complaint_cap);
            hits.push(FactorHit::new(
                Factor::RecentComplaints,
                self.config.recent_complaint_points.saturating_mul(counted),
                format!("{recent} recent complaints in area"),
            ));
        }

        hits
    }

    fn is_peak(&self, now: DateTime<Utc>) -> bool {
        let hour = now.with_timezone(&self.local_offset).hour();
        self.config.peak_windows.iter().any(|window| window.contains(hour))
    }
}
