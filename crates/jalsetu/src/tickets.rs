use fxhash::FxHashMap;
use jal_domain::{TicketId, TicketRequest};
use parking_lot::RwLock;

/// Open ticket requests issued by the engine, keyed by ticket id.
#[derive(Debug, Default)]
pub struct TicketBook {
    open: RwLock<FxHashMap<TicketId, TicketRequest>>,
}

impl TicketBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, ticket: TicketRequest) {
        self.open.write().insert(ticket.id.clone(), ticket);
    }

    /// Removes and returns the ticket, `None` if it was not open.
    pub fn close(&self, id: &TicketId) -> Option<TicketRequest> {
        self.open.write().remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &TicketId) -> Option<TicketRequest> {
        self.open.read().get(id).cloned()
    }

    /// Open tickets in no particular order.
    #[must_use]
    pub fn open_tickets(&self) -> Vec<TicketRequest> {
        self.open.read().values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.open.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open.read().is_empty()
    }
}
