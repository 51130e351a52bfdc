//! # Event Bus
//!
//! Typed publish/subscribe for the decision engine's outputs.
//!
//! Channels are keyed by the event's Rust type. Two kinds exist:
//!
//! * **Broadcast**: fan-out of discrete events (alerts, leak events, ticket
//!   requests). Publishing with no subscribers is not an error; the event is
//!   dropped and `0` is returned.
//! * **Watch**: latest-value cells (the most recent citywide equity report).
//!   Late subscribers see the current value immediately.
//!
//! The first use of a type fixes its channel kind. Using the other kind for
//! the same type afterwards fails with [`EventBusError::ChannelKindMismatch`].
//!
//! # Example
//!
//! ```rust
//! use jal_event_bus::{EventBus, EventBusError, EventReceiverExt};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct LeakSuspected { sensor: &'static str }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     let mut rx = bus.subscribe::<LeakSuspected>()?;
//!     bus.publish(LeakSuspected { sensor: "S-1" })?;
//!
//!     let event = rx.recv_event().await.unwrap();
//!     assert_eq!(event.sensor, "S-1");
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{ChannelKind, DEFAULT_CAPACITY, Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
