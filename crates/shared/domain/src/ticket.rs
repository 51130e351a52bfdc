use crate::ids::{ComplaintId, LeakEventId, TicketId, WardId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket priority. Derived ordering puts `P1` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriorityTier {
    P1,
    P2,
    P3,
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
        })
    }
}

/// Named contributor to a ticket's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    NoWater,
    LowPressure,
    LeakReport,
    LowEquityWard,
    HighPopulation,
    RecentComplaints,
    SensorCorroboration,
    PeakHours,
    CriticalTelemetry,
}

impl Factor {
    /// Factors that need a resolved ward.
    #[must_use]
    pub const fn is_ward_dependent(self) -> bool {
        matches!(self, Self::LowEquityWard | Self::HighPopulation | Self::RecentComplaints)
    }
}

/// One triggered factor with its points and a readable explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorHit {
    pub factor: Factor,
    pub points: u32,
    pub detail: String,
}

impl FactorHit {
    pub fn new(factor: Factor, points: u32, detail: impl Into<String>) -> Self {
        Self { factor, points, detail: detail.into() }
    }
}

/// What a ticket was raised for. Exactly one origin per ticket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum TicketOrigin {
    Complaint(ComplaintId),
    LeakEvent(LeakEventId),
}

/// Request to open a work ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRequest {
    pub id: TicketId,
    pub origin: TicketOrigin,
    pub tier: PriorityTier,
    pub score: u32,
    pub sla_hours: u32,
    pub created_at: DateTime<Utc>,
    pub sla_deadline: DateTime<Utc>,
    pub factors: Vec<FactorHit>,
}

/// Non-fatal shortcut taken while scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// The complaint named a ward the registry does not know; ward factors were skipped.
    UnknownWard { ward_id: WardId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_serializes_with_kind_tag() {
        let origin = TicketOrigin::LeakEvent(LeakEventId::from("LK-1"));
        let json = serde_json::to_value(&origin).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "leak_event", "id": "LK-1" }));
    }

    #[test]
    fn tiers_order_most_urgent_first() {
        let mut tiers = vec![PriorityTier::P3, PriorityTier::P1, PriorityTier::P2];
        tiers.sort();
        assert_eq!(tiers, [PriorityTier::P1, PriorityTier::P2, PriorityTier::P3]);
    }
}
