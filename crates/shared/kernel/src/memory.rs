//! In-memory collaborators for tests and the replay tool.

use crate::KernelError;
use crate::directory::{ComplaintLog, ComplaintStats, ReadingHistory, SensorDirectory, WardDirectory};
use chrono::{DateTime, Duration, Utc};
use fxhash::FxHashMap;
use jal_domain::{Complaint, ComplaintId, ComplaintStatus, SensorId, SensorReading, Ward, WardId};
use parking_lot::RwLock;
use std::collections::VecDeque;
use tracing::debug;

/// Wards plus the sensor to ward mapping.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    wards: RwLock<FxHashMap<WardId, Ward>>,
    sensors: RwLock<FxHashMap<SensorId, WardId>>,
}

impl InMemoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wards(wards: impl IntoIterator<Item = Ward>) -> Self {
        let registry = Self::new();
        for ward in wards {
            registry.upsert_ward(ward);
        }
        registry
    }

    pub fn upsert_ward(&self, ward: Ward) {
        self.wards.write().insert(ward.id, ward);
    }

    /// Maps `sensor` to `ward`, replacing any previous mapping.
    ///
    /// # Errors
    /// Returns [`KernelError::UnknownWard`] when `ward` is not registered.
    pub fn map_sensor(&self, sensor: impl Into<SensorId>, ward: WardId) -> Result<(), KernelError> {
        if !self.wards.read().contains_key(&ward) {
            return Err(KernelError::UnknownWard { message: ward.to_string().into(), context: None });
        }
        self.sensors.write().insert(sensor.into(), ward);
        Ok(())
    }

    /// Updates the cached equity score of a ward.
    ///
    /// # Errors
    /// Returns [`KernelError::UnknownWard`] when `ward` is not registered.
    pub fn set_equity_score(&self, ward: WardId, score: f64) -> Result<(), KernelError> {
        let mut wards = self.wards.write();
        let entry = wards.get_mut(&ward).ok_or_else(|| KernelError::UnknownWard {
            message: ward.to_string().into(),
            context: Some("updating cached equity score".into()),
        })?;
        entry.equity_score = score;
        Ok(())
    }
}

impl WardDirectory for InMemoryRegistry {
    fn ward(&self, id: WardId) -> Option<Ward> {
        self.wards.read().get(&id).cloned()
    }

    fn wards(&self) -> Vec<Ward> {
        let mut wards: Vec<Ward> = self.wards.read().values().cloned().collect();
        wards.sort_by_key(|w| w.id);
        wards
    }
}

impl SensorDirectory for InMemoryRegistry {
    fn ward_of(&self, sensor: &SensorId) -> Option<WardId> {
        self.sensors.read().get(sensor).copied()
    }

    fn sensors_in(&self, ward: WardId) -> Vec<SensorId> {
        let mut sensors: Vec<SensorId> = self
            .sensors
            .read()
            .iter()
            .filter(|(_, w)| **w == ward)
            .map(|(s, _)| s.clone())
            .collect();
        sensors.sort();
        sensors
    }
}

/// Complaint records with their current status.
#[derive(Debug, Default)]
pub struct InMemoryComplaintLog {
    complaints: RwLock<FxHashMap<ComplaintId, Complaint>>,
}

impl InMemoryComplaintLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces a complaint.
    pub fn record(&self, complaint: Complaint) {
        self.complaints.write().insert(complaint.id, complaint);
    }

    #[must_use]
    pub fn get(&self, id: ComplaintId) -> Option<Complaint> {
        self.complaints.read().get(&id).cloned()
    }

    /// # Errors
    /// Returns [`KernelError::UnknownComplaint`] when `id` was never recorded.
    pub fn set_status(&self, id: ComplaintId, status: ComplaintStatus) -> Result<(), KernelError> {
        let mut complaints = self.complaints.write();
        let complaint = complaints.get_mut(&id).ok_or_else(|| KernelError::UnknownComplaint {
            message: id.to_string().into(),
            context: None,
        })?;
        complaint.status = status;
        Ok(())
    }
}

impl ComplaintStats for InMemoryComplaintLog {
    fn unresolved_since(&self, ward: WardId, since: DateTime<Utc>) -> u32 {
        let count = self
            .complaints
            .read()
            .values()
            .filter(|c| c.ward_id == Some(ward) && c.created_at >= since && c.status.is_unresolved())
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

impl ComplaintLog for InMemoryComplaintLog {
    fn record(&self, complaint: Complaint) {
        Self::record(self, complaint);
    }

    fn complaint(&self, id: ComplaintId) -> Option<Complaint> {
        self.get(id)
    }

    fn set_status(&self, id: ComplaintId, status: ComplaintStatus) -> Result<(), KernelError> {
        Self::set_status(self, id, status)
    }
}

/// Bounded trailing log of accepted readings.
#[derive(Debug)]
pub struct InMemoryReadingLog {
    readings: RwLock<VecDeque<SensorReading>>,
    retention: Duration,
}

impl Default for InMemoryReadingLog {
    fn default() -> Self {
        Self::with_retention(Duration::hours(24))
    }
}

impl InMemoryReadingLog {
    /// Readings older than `retention` relative to the newest one are dropped on insert.
    #[must_use]
    pub fn with_retention(retention: Duration) -> Self {
        Self { readings: RwLock::new(VecDeque::new()), retention }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.readings.read().len()
    }
}

impl ReadingHistory for InMemoryReadingLog {
    fn record(&self, reading: &SensorReading) {
        let mut readings = self.readings.write();
        let position = readings.partition_point(|r| r.timestamp <= reading.timestamp);
        readings.insert(position, reading.clone());

        if let Some(newest) = readings.back().map(|r| r.timestamp) {
            let cutoff = newest - self.retention;
            let before = readings.len();
            while readings.front().is_some_and(|r| r.timestamp < cutoff) {
                readings.pop_front();
            }
            let pruned = before - readings.len();
            if pruned > 0 {
                debug!(pruned, "Pruned readings outside retention window");
            }
        }
    }

    fn readings_since(&self, since: DateTime<Utc>) -> Vec<SensorReading> {
        let readings = self.readings.read();
        let start = readings.partition_point(|r| r.timestamp < since);
        readings.range(start..).cloned().collect()
    }
}
