//! One NDJSON line of the replay stream.

use chrono::{DateTime, Utc};
use jalsetu::domain::{Complaint, SensorId, TicketId, WardId};
use jalsetu::telemetry::reading::RawReading;
use serde::Deserialize;

const DEFAULT_QUEUE_LIMIT: usize = 10;
const DEFAULT_STATS_HOURS: i64 = 24;

/// A command plus the replay time it runs at.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    /// Moves the replay clock before the command runs. Omitted means the
    /// clock stays where the previous line left it.
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub command: Command,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    Complaint(Complaint),
    Reading(RawReading),
    Resolve {
        ticket_id: TicketId,
    },
    WardEquity {
        ward_id: WardId,
    },
    CitywideEquity,
    Queue {
        #[serde(default = "default_queue_limit")]
        limit: usize,
    },
    /// One sensor, or the whole fleet when `sensor_id` is omitted.
    Health {
        #[serde(default)]
        sensor_id: Option<SensorId>,
    },
    /// Reading statistics over the trailing `hours`, optionally for one sensor.
    Stats {
        #[serde(default)]
        sensor_id: Option<SensorId>,
        #[serde(default = "default_stats_hours")]
        hours: i64,
    },
}

impl Command {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Complaint(_) => "complaint",
            Self::Reading(_) => "reading",
            Self::Resolve { .. } => "resolve",
            Self::WardEquity { .. } => "ward_equity",
            Self::CitywideEquity => "citywide_equity",
            Self::Queue { .. } => "queue",
            Self::Health { .. } => "health",
            Self::Stats { .. } => "stats",
        }
    }
}

const fn default_queue_limit() -> usize {
    DEFAULT_QUEUE_LIMIT
}

const fn default_stats_hours() -> i64 {
    DEFAULT_STATS_HOURS
}
