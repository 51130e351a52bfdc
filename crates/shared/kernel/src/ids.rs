//! Generated identifiers for engine outputs.

use jal_domain::{LeakEventId, TicketId};

/// `TK-` followed by a 12 character safe nanoid.
#[must_use]
pub fn ticket_id() -> TicketId {
    TicketId::new(format!("TK-{}", crate::safe_nanoid!()))
}

/// `LK-` followed by a 12 character safe nanoid.
#[must_use]
pub fn leak_event_id() -> LeakEventId {
    LeakEventId::new(format!("LK-{}", crate::safe_nanoid!()))
}
