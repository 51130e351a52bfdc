use jal_equity::EquityError;
use jal_event_bus::EventBusError;
use jal_kernel::KernelError;
use jal_priority::PriorityError;
use jal_telemetry::TelemetryError;
use std::borrow::Cow;

#[jal_derive::jal_error]
pub enum EngineError {
    #[error("Engine validation error{}: {message}", format_context(context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Resolve request for a ticket that is not open.
    #[error("Unknown ticket{}: {message}", format_context(context))]
    UnknownTicket { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Priority error{}: {source}", format_context(context))]
    Priority { source: PriorityError, context: Option<Cow<'static, str>> },

    #[error("Telemetry error{}: {source}", format_context(context))]
    Telemetry { source: TelemetryError, context: Option<Cow<'static, str>> },

    #[error("Equity error{}: {source}", format_context(context))]
    Equity { source: EquityError, context: Option<Cow<'static, str>> },

    #[error("Event bus error{}: {source}", format_context(context))]
    Events { source: EventBusError, context: Option<Cow<'static, str>> },

    #[error("Kernel error{}: {source}", format_context(context))]
    Kernel { source: KernelError, context: Option<Cow<'static, str>> },

    #[error("Internal engine error{}: {message}", format_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
