//! Contracts for the data the engine reads but does not own.
//!
//! Implementations must be cheap to call from scoring paths; none of these
//! methods is expected to block on I/O for long.

use crate::KernelError;
use chrono::{DateTime, Utc};
use jal_domain::{Complaint, ComplaintId, ComplaintStatus, SensorId, SensorReading, Ward, WardId};
use std::fmt::Debug;

/// Ward registry reads.
pub trait WardDirectory: Send + Sync + Debug {
    fn ward(&self, id: WardId) -> Option<Ward>;

    /// All wards, ordered by id.
    fn wards(&self) -> Vec<Ward>;
}

/// Sensor to ward mapping.
pub trait SensorDirectory: Send + Sync + Debug {
    fn ward_of(&self, sensor: &SensorId) -> Option<WardId>;

    fn sensors_in(&self, ward: WardId) -> Vec<SensorId>;
}

/// Complaint aggregate lookups.
pub trait ComplaintStats: Send + Sync + Debug {
    /// Unresolved complaints filed in `ward` at or after `since`.
    fn unresolved_since(&self, ward: WardId, since: DateTime<Utc>) -> u32;
}

/// Complaint intake store. Writes go through the engine so the recent
/// complaint counts stay current.
pub trait ComplaintLog: ComplaintStats {
    fn record(&self, complaint: Complaint);

    fn complaint(&self, id: ComplaintId) -> Option<Complaint>;

    /// # Errors
    /// Returns [`KernelError::UnknownComplaint`] when `id` was never recorded.
    fn set_status(&self, id: ComplaintId, status: ComplaintStatus) -> Result<(), KernelError>;
}

/// Accepted readings over a trailing window.
pub trait ReadingHistory: Send + Sync + Debug {
    fn record(&self, reading: &SensorReading);

    /// Readings with `timestamp >= since`, oldest first.
    fn readings_since(&self, since: DateTime<Utc>) -> Vec<SensorReading>;
}
