use std::borrow::Cow;

/// Errors raised by [`crate::EventBus`].
#[jal_derive::jal_error]
pub enum EventBusError {
    /// A stored sender did not downcast to the requested event type.
    /// Indicates a broken registry invariant.
    #[error("Type mismatch{}: {message}", format_context(context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The type is already registered with the other channel kind.
    #[error("Channel kind mismatch{}: {message}", format_context(context))]
    ChannelKindMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Broadcast buffers need room for at least one event.
    #[error("Invalid capacity{}: {message}", format_context(context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
