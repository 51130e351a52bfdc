//! # Priority Scoring
//!
//! Turns a citizen complaint into a ticket request with a priority tier and
//! an SLA deadline.
//!
//! ## Scoring
//!
//! The score is an additive, order-independent sum of triggered factors:
//! keyword signals in the issue text ([`matcher`]), ward context from the
//! registry, recent unresolved complaints in the same ward, a corroborating
//! low-pressure sensor reading and the local peak-hour window. Every
//! triggered factor is reported with its points and a readable detail so a
//! ticket's priority can be audited.
//!
//! Ward-dependent factors degrade instead of failing: an unknown ward is
//! reported as [`jal_domain::Degradation::UnknownWard`] and the remaining
//! factors still apply.
//!
//! ## Queue
//!
//! [`queue::rank_open_tickets`] orders open tickets by tier, then deadline,
//! and labels each with its remaining time and urgency.

mod error;
pub mod matcher;
pub mod queue;
mod scorer;
pub mod tier;

pub use crate::error::{PriorityError, PriorityErrorExt};
pub use crate::matcher::{IssueMatcher, IssueSignal, KeywordMatcher};
pub use crate::scorer::{PriorityAssessment, PriorityScorer};
