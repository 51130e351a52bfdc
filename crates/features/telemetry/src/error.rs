use std::borrow::Cow;

#[jal_derive::jal_error]
pub enum TelemetryError {
    /// Missing, non-numeric or non-finite measurement. The reading is discarded.
    #[error("Malformed reading{}: {message}", format_context(context))]
    MalformedReading { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid telemetry configuration{}: {message}", format_context(context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal telemetry error{}: {message}", format_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
