//! # Domain Models
//!
//! Data types shared by every engine crate, with minimal dependencies
//! (`serde`, `chrono`). No I/O and no scoring logic lives here: only the
//! shapes, fixed lookup tables (recommended actions, band colors, status
//! messages) and the configuration structs with their defaults.
//!
//! All outputs serialize with snake_case field names.

pub mod complaint;
pub mod config;
pub mod equity;
pub mod ids;
pub mod telemetry;
pub mod ticket;
pub mod ward;

pub use complaint::{Complaint, ComplaintStatus};
pub use equity::{CityStatus, CitywideEquityReport, EquityLevel, EquityMetrics, EquitySnapshot};
pub use ids::{ComplaintId, LeakEventId, SensorId, TicketId, WardId};
pub use telemetry::{AnomalyAlert, AnomalyType, Classification, DetectionSource, LeakEvent, SensorReading, Severity};
pub use ticket::{Degradation, Factor, FactorHit, PriorityTier, TicketOrigin, TicketRequest};
pub use ward::Ward;
