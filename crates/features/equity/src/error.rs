use std::borrow::Cow;

#[jal_derive::jal_error]
pub enum EquityError {
    /// Direct request for a ward the registry does not know.
    #[error("Unknown ward{}: {message}", format_context(context))]
    UnknownWard { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid equity configuration{}: {message}", format_context(context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal equity error{}: {message}", format_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
