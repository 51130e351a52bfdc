//! # Equity
//!
//! Measures how fairly water reaches each ward, and how unevenly it is
//! spread across the city.
//!
//! Scoring runs in two independent passes over the same trailing window:
//!
//! 1. [`WardAggregator`] folds raw readings (24 h) and unresolved complaints
//!    (7 d) into one [`WardAggregate`] per ward, then derives the
//!    [`CityBaseline`] from those aggregates.
//! 2. [`EquityScorer`] scores each aggregate against the baseline. A score of
//!    `1.0` means the ward sits exactly at the city average.
//!
//! [`inequality`] summarises the scored wards with a Gini coefficient and a
//! citywide status.
//!
//! Zero baselines never fail: the affected ratio falls back to `1.0`.

mod aggregate;
mod error;
pub mod inequality;
mod scorer;

pub use crate::aggregate::{CityBaseline, WardAggregate, WardAggregator};
pub use crate::error::{EquityError, EquityErrorExt};
pub use crate::scorer::{EquityScorer, level_for, validate_config};
