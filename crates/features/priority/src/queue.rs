//! Work queue ordering for open tickets.

use chrono::{DateTime, Utc};
use jal_domain::TicketRequest;
use serde::Serialize;

const CRITICAL_WITHIN_HOURS: f64 = 2.0;
const HIGH_WITHIN_HOURS: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Critical,
    High,
    Normal,
}

impl Urgency {
    /// Overdue tickets count as critical.
    #[must_use]
    pub fn from_hours_remaining(hours: f64) -> Self {
        if hours < CRITICAL_WITHIN_HOURS {
            Self::Critical
        } else if hours < HIGH_WITHIN_HOURS {
            Self::High
        } else {
            Self::Normal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTicket {
    pub ticket: TicketRequest,
    /// Negative once the deadline has passed. Rounded to one decimal.
    pub hours_remaining: f64,
    pub is_overdue: bool,
    pub urgency: Urgency,
}

/// Orders tickets by tier (P1 first), then by SLA deadline, and keeps the first `limit`.
pub fn rank_open_tickets<'a>(
    tickets: impl IntoIterator<Item = &'a TicketRequest>,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<RankedTicket> {
    let mut open: Vec<&TicketRequest> = tickets.into_iter().collect();
    open.sort_by(|a, b| a.tier.cmp(&b.tier).then(a.sla_deadline.cmp(&b.sla_deadline)));

    open.into_iter()
        .take(limit)
        .map(|ticket| {
            let seconds = (ticket.sla_deadline - now).num_seconds() as f64;
            let hours = seconds / 3600.0;
            RankedTicket {
                ticket: ticket.clone(),
                hours_remaining: (hours * 10.0).round() / 10.0,
                is_overdue: hours < 0.0,
                urgency: Urgency::from_hours_remaining(hours),
            }
        })
        .collect()
}
