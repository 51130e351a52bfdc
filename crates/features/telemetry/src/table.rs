use fxhash::FxHashMap;
use jal_domain::{SensorId, SensorReading, TicketId};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Working state for one sensor.
#[derive(Debug, Default)]
pub(crate) struct SensorSlot {
    /// Last accepted reading. Overwritten, never appended.
    pub(crate) last: Option<SensorReading>,
    /// Leak ticket raised for this sensor and not yet resolved.
    pub(crate) open_leak_ticket: Option<TicketId>,
}

/// Per-sensor state keyed by sensor id.
///
/// The map lock is held only to find or insert a slot. Each slot has its
/// own mutex, so there is a single writer per sensor.
#[derive(Debug, Default)]
pub struct SensorTable {
    slots: RwLock<FxHashMap<SensorId, Arc<Mutex<SensorSlot>>>>,
}

impl SensorTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn slot(&self, sensor: &SensorId) -> Arc<Mutex<SensorSlot>> {
        if let Some(slot) = self.slots.read().get(sensor) {
            return Arc::clone(slot);
        }
        Arc::clone(self.slots.write().entry(sensor.clone()).or_default())
    }

    #[must_use]
    pub fn last_reading(&self, sensor: &SensorId) -> Option<SensorReading> {
        let slot = self.slots.read().get(sensor).cloned()?;
        slot.lock().last.clone()
    }

    #[must_use]
    pub fn open_leak_ticket(&self, sensor: &SensorId) -> Option<TicketId> {
        let slot = self.slots.read().get(sensor).cloned()?;
        slot.lock().open_leak_ticket.clone()
    }

    /// Clears `ticket` from whichever sensor holds it. Returns that sensor.
    pub(crate) fn release_ticket(&self, ticket: &TicketId) -> Option<SensorId> {
        let slots: Vec<(SensorId, Arc<Mutex<SensorSlot>>)> =
            self.slots.read().iter().map(|(id, slot)| (id.clone(), Arc::clone(slot))).collect();

        slots.into_iter().find_map(|(sensor, slot)| {
            let mut slot = slot.lock();
            (slot.open_leak_ticket.as_ref() == Some(ticket)).then(|| {
                slot.open_leak_ticket = None;
                sensor
            })
        })
    }

    /// Every known sensor with its last reading, ordered by sensor id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(SensorId, Option<SensorReading>)> {
        let slots: Vec<(SensorId, Arc<Mutex<SensorSlot>>)> =
            self.slots.read().iter().map(|(id, slot)| (id.clone(), Arc::clone(slot))).collect();

        let mut snapshot: Vec<_> =
            slots.into_iter().map(|(id, slot)| (id, slot.lock().last.clone())).collect();
        snapshot.sort_by(|a, b| a.0.cmp(&b.0));
        snapshot
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}
