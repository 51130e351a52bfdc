//! # JalSetu
//!
//! Facade over the decision engine crates. [`DecisionEngine`] owns the
//! scorers, the per-sensor telemetry state and the open ticket book, and
//! publishes every output on the [`jal_event_bus::EventBus`] as well as
//! returning it to the caller.
//!
//! Keep this crate thin: scoring rules live in the feature crates.
//!
//! ## Usage
//! ```rust,ignore
//! use jalsetu::DecisionEngine;
//! use jalsetu::kernel::memory::InMemoryRegistry;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(InMemoryRegistry::new());
//! let engine = DecisionEngine::builder().registry(registry).build()?;
//! let ticket = engine.submit_complaint(complaint)?;
//! ```
//!
//! ## Published events
//!
//! | type | channel |
//! |---|---|
//! | [`domain::TicketRequest`] | broadcast |
//! | [`domain::LeakEvent`] | broadcast |
//! | [`domain::AnomalyAlert`] | broadcast, anomalous readings only |
//! | [`domain::EquitySnapshot`] | broadcast |
//! | [`domain::CitywideEquityReport`] | watch, latest report |

mod engine;
mod error;
mod tickets;

pub use crate::engine::{ComplaintOutcome, DecisionEngine, DecisionEngineBuilder, DecisionEngineInner};
pub use crate::error::{EngineError, EngineErrorExt};
pub use crate::tickets::TicketBook;

pub use jal_domain as domain;
pub use jal_equity as equity;
pub use jal_event_bus as events;
pub use jal_kernel as kernel;
pub use jal_priority as priority;
pub use jal_telemetry as telemetry;
