use crate::command::{Command, Envelope};
use chrono::{DateTime, Duration, Utc};
use jalsetu::domain::{AnomalyAlert, LeakEvent, TicketRequest};
use jalsetu::events::{EventBusError, EventReceiverExt};
use jalsetu::kernel::clock::{Clock, FixedClock};
use jalsetu::{DecisionEngine, EngineError};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Counters reported once the stream is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub lines: usize,
    pub applied: usize,
    pub failed: usize,
    pub tickets: usize,
    pub leaks: usize,
    pub alerts: usize,
}

#[derive(Debug, Serialize)]
struct Line<'a> {
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<&'static str>,
    #[serde(flatten)]
    body: Body<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Body<'a> {
    Result(serde_json::Value),
    Error { kind: &'static str, message: String },
    Ticket(&'a TicketRequest),
    Leak(&'a LeakEvent),
    Alert(&'a AnomalyAlert),
}

/// Drives a [`DecisionEngine`] from an NDJSON command stream.
///
/// Every command prints one JSON line with its result or error, followed by
/// one line per event the command published. Lines that fail to parse or
/// execute are reported and skipped.
#[derive(Debug)]
pub struct Replay {
    engine: DecisionEngine,
    clock: Arc<FixedClock>,
    tickets: broadcast::Receiver<Arc<TicketRequest>>,
    leaks: broadcast::Receiver<Arc<LeakEvent>>,
    alerts: broadcast::Receiver<Arc<AnomalyAlert>>,
}

impl Replay {
    /// `clock` must be the clock `engine` was built with.
    ///
    /// # Errors
    /// Returns [`EventBusError`] when the engine's bus refuses a subscription.
    pub fn new(engine: DecisionEngine, clock: Arc<FixedClock>) -> Result<Self, EventBusError> {
        let tickets = engine.events.subscribe::<TicketRequest>()?;
        let leaks = engine.events.subscribe::<LeakEvent>()?;
        let alerts = engine.events.subscribe::<AnomalyAlert>()?;
        Ok(Self { engine, clock, tickets, leaks, alerts })
    }

    #[must_use]
    pub const fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Replays `input` to the end, writing result lines to `out`.
    ///
    /// # Errors
    /// Fails only on I/O errors reading `input` or writing `out`.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> anyhow::Result<ReplaySummary>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut summary = ReplaySummary::default();
        let mut lines = input.lines();
        let mut number = 0;

        while let Some(text) = lines.next_line().await? {
            number += 1;
            let text = text.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            summary.lines += 1;

            let envelope = match serde_json::from_str::<Envelope>(text) {
                Ok(envelope) => envelope,
                Err(err) => {
                    warn!(line = number, error = %err, "Unreadable replay line");
                    summary.failed += 1;
                    let body = Body::Error { kind: "parse", message: err.to_string() };
                    write_line(out, &Line { line: number, command: None, body })?;
                    continue;
                },
            };

            if let Some(at) = envelope.at {
                self.advance_to(at);
            }

            let name = envelope.command.name();
            let body = match self.execute(envelope.command) {
                Ok(value) => {
                    summary.applied += 1;
                    Body::Result(value)
                },
                Err(err) => {
                    warn!(line = number, command = name, kind = err.kind(), error = %err, "Command failed");
                    summary.failed += 1;
                    Body::Error { kind: err.kind(), message: err.to_string() }
                },
            };
            write_line(out, &Line { line: number, command: Some(name), body })?;

            self.flush_events(number, out, &mut summary)?;
        }

        out.flush()?;
        info!(
            lines = summary.lines,
            applied = summary.applied,
            failed = summary.failed,
            tickets = summary.tickets,
            leaks = summary.leaks,
            "Replay finished"
        );
        Ok(summary)
    }

    fn advance_to(&self, at: DateTime<Utc>) {
        if at < self.clock.now() {
            debug!(at = %at, "Replay clock moved backwards");
        }
        self.clock.set(at);
    }

    fn execute(&self, command: Command) -> Result<serde_json::Value, EngineError> {
        let engine = &self.engine;
        match command {
            Command::Complaint(complaint) => to_value(&engine.submit_complaint(complaint)?),
            Command::Reading(raw) => to_value(&engine.ingest_reading(raw)?),
            Command::Resolve { ticket_id } => to_value(&engine.resolve_ticket(&ticket_id)?),
            Command::WardEquity { ward_id } => to_value(&engine.ward_equity(ward_id)?),
            Command::CitywideEquity => to_value(&engine.citywide_equity()),
            Command::Queue { limit } => to_value(&engine.open_tickets(limit)),
            Command::Health { sensor_id: Some(sensor) } => to_value(&engine.sensor_health(&sensor)),
            Command::Health { sensor_id: None } => to_value(&engine.fleet_health()),
            Command::Stats { sensor_id, hours } => {
                let window = Duration::try_hours(hours).filter(|_| hours > 0).ok_or_else(|| {
                    EngineError::Validation {
                        message: format!("stats window of {hours}h is out of range").into(),
                        context: None,
                    }
                })?;
                to_value(&engine.reading_stats(sensor_id.as_ref(), window))
            }
        }
    }

    fn flush_events<W: Write>(
        &mut self,
        line: usize,
        out: &mut W,
        summary: &mut ReplaySummary,
    ) -> std::io::Result<()> {
        for ticket in self.tickets.drain_ready() {
            summary.tickets += 1;
            write_line(out, &Line { line, command: None, body: Body::Ticket(&ticket) })?;
        }
        for leak in self.leaks.drain_ready() {
            summary.leaks += 1;
            write_line(out, &Line { line, command: None, body: Body::Leak(&leak) })?;
        }
        for alert in self.alerts.drain_ready() {
            summary.alerts += 1;
            write_line(out, &Line { line, command: None, body: Body::Alert(&alert) })?;
        }
        Ok(())
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, EngineError> {
    serde_json::to_value(value).map_err(|err| EngineError::Internal {
        message: format!("serializing result: {err}").into(),
        context: None,
    })
}

fn write_line<W: Write>(out: &mut W, line: &Line<'_>) -> std::io::Result<()> {
    serde_json::to_writer(&mut *out, line)?;
    out.write_all(b"\n")
}
