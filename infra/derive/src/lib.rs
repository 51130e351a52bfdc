#![allow(unreachable_pub)]

//! # Derive
//!
//! Procedural macros shared by the decision engine crates.
//!
//! The only macro today is [`macro@jal_error`], which turns a plain enum into the
//! workspace's standard error shape. Consumers add the crate alongside `thiserror`:
//! ```toml
//! [dependencies]
//! jal-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for crate-level error enums.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already present.
/// * `<ErrorName>Ext` trait with `.context(...)` for `Result<T, ErrorName>` and for
///   `Result<T, Source>` of every variant that wraps a `source` field.
/// * `From<Source>` for every variant with a `source` field (enables `?`).
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * `ErrorName::kind()`, the snake_case variant name for structured log fields.
/// * A module-private `format_context` helper used inside `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. Only enums are accepted, and every variant must use named fields.
/// 2. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 3. Variants that wrap a source error must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use jal_derive::jal_error;
/// use std::borrow::Cow;
///
/// #[jal_error]
/// pub enum TelemetryError {
///     #[error("Malformed reading{}: {message}", format_context(.context))]
///     MalformedReading { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("Internal telemetry error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn check(pressure: f64) -> Result<(), TelemetryError> {
///     if pressure.is_nan() {
///         return Err("pressure is NaN".into());
///     }
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn jal_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
