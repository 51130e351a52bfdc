//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

/// Replays an NDJSON stream of complaints, readings and queries through
/// the decision engine and prints every result and published event as a
/// JSON line.
#[derive(Debug, Parser)]
#[command(name = "jal-replay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Replay complaints and telemetry through the JalSetu decision engine")]
pub struct Cli {
    /// Engine config file (TOML, JSON or YAML). Defaults to an optional `engine.*`.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ward registry: wards plus sensor to ward mappings, as JSON.
    #[arg(short, long)]
    pub registry: PathBuf,

    /// NDJSON command stream. Reads stdin when omitted.
    #[arg(short, long)]
    pub events: Option<PathBuf>,
}
