use std::borrow::Cow;

#[jal_derive::jal_error]
pub enum PriorityError {
    /// Resolved complaints do not get new tickets.
    #[error("Complaint already resolved{}: {message}", format_context(context))]
    ComplaintResolved { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Tier thresholds or SLA hours that cannot produce a consistent tiering.
    #[error("Invalid priority configuration{}: {message}", format_context(context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal priority error{}: {message}", format_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
