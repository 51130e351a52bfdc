//! # JalSetu replay
//!
//! Feeds a newline-delimited JSON stream of complaints, sensor readings and
//! queries through a [`jalsetu::DecisionEngine`] driven by a replay clock,
//! and prints each result plus every published ticket, leak and alert as a
//! JSON line on stdout. Logs go to stderr.
//!
//! ## Stream format
//!
//! ```text
//! {"at":"2026-08-03T06:30:00Z","kind":"reading","sensor_id":"S-101","pressure":1.2,"flow":80}
//! {"kind":"complaint","id":7,"ward_id":2,"issue":"No water since morning","created_at":"2026-08-03T06:31:00Z"}
//! {"kind":"queue","limit":5}
//! {"kind":"citywide_equity"}
//! {"kind":"stats","sensor_id":"S-101","hours":6}
//! ```
//!
//! `at` moves the replay clock before the command runs. Blank lines and
//! lines starting with `#` are skipped.

pub mod cli;
pub mod command;
pub mod registry;
mod replay;

pub use crate::replay::{Replay, ReplaySummary};

use anyhow::Context;
use chrono::Utc;
use jal_logger::{Logger, parse_level, parse_rotation};
use jalsetu::DecisionEngine;
use jalsetu::domain::config::{EngineConfig, LogConfig};
use jalsetu::kernel::clock::FixedClock;
use std::sync::Arc;

/// Installs the logger described by the `[log]` config section.
///
/// # Errors
/// Fails on an unknown level or rotation, bad filter directives, or when a
/// global subscriber is already installed.
pub fn init_logger(config: &LogConfig) -> anyhow::Result<Logger> {
    let level = parse_level(&config.level)?;
    let mut builder = Logger::builder().name(config.name.clone()).level(level).console(config.console);
    if let Some(filter) = &config.filter {
        builder = builder.env_filter(filter.clone());
    }

    let logger = match &config.directory {
        Some(directory) => builder
            .path(directory)
            .rotation(parse_rotation(&config.rotation)?)
            .max_files(config.max_files)
            .json(config.json)
            .init(),
        None => builder.init(),
    };
    logger.context("initializing logger")
}

/// Builds an engine on a replay clock starting at the current time.
///
/// # Errors
/// Fails when the config is inconsistent or the engine's bus refuses the
/// replay subscriptions.
pub fn replay_engine(
    config: EngineConfig,
    registry: registry::RegistryFile,
) -> anyhow::Result<Replay> {
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let registry = Arc::new(registry.into_registry().context("loading ward registry")?);

    let engine = DecisionEngine::builder()
        .config(config)
        .clock(clock.clone())
        .registry(registry)
        .build()
        .context("building decision engine")?;

    Ok(Replay::new(engine, clock)?)
}
