//! # Telemetry
//!
//! Everything that happens to a sensor reading after it arrives.
//!
//! 1. [`reading::RawReading`] is validated into a [`jal_domain::SensorReading`].
//!    Missing or non-numeric pressure/flow rejects the reading and leaves
//!    sensor state untouched.
//! 2. [`AnomalyClassifier`] compares it with the sensor's last accepted
//!    reading. Rules run in a fixed order and the first match wins.
//! 3. A critical classification goes to the [`LeakSynthesizer`], which
//!    raises a leak event and a forced-P1 ticket request.
//!
//! [`TelemetryMonitor`] runs the three steps for one sensor under that
//! sensor's own lock, so concurrent readings for one sensor are serialized
//! while different sensors proceed in parallel. The same lock guards the
//! "one open leak ticket per sensor" check.
//!
//! [`health`] and [`stats`] are read-side helpers over accepted readings.

mod classifier;
mod error;
pub mod health;
mod leak;
mod monitor;
pub mod reading;
pub mod stats;
mod table;

pub use crate::classifier::AnomalyClassifier;
pub use crate::error::{TelemetryError, TelemetryErrorExt};
pub use crate::leak::{LeakDetection, LeakSynthesizer};
pub use crate::monitor::{TelemetryMonitor, TelemetryOutcome};
pub use crate::table::SensorTable;
