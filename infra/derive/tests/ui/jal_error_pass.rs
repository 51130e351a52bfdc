use jal_derive::jal_error;
use std::borrow::Cow;

#[jal_error]
pub enum GaugeError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Gauge offline{}: {message}", format_context(.context))]
    Offline { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), GaugeError> {
    Err(std::io::Error::other("disk")).context("reading gauge")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.kind(), "io");
}
