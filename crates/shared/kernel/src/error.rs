use std::borrow::Cow;

/// Errors raised by the in-memory collaborators.
#[jal_derive::jal_error]
pub enum KernelError {
    #[error("Unknown complaint{}: {message}", format_context(context))]
    UnknownComplaint { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unknown ward{}: {message}", format_context(context))]
    UnknownWard { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal kernel error{}: {message}", format_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
