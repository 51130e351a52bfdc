//! Per-item outcome collection for batch operations.

use serde::Serialize;

/// Outcome of a batch: every item lands in exactly one list, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport<T, E> {
    pub succeeded: Vec<T>,
    pub failed: Vec<BatchFailure<E>>,
}

/// A failed item with its position in the input.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure<E> {
    pub index: usize,
    pub error: E,
}

impl<T, E> Default for BatchReport<T, E> {
    fn default() -> Self {
        Self { succeeded: Vec::new(), failed: Vec::new() }
    }
}

impl<T, E> BatchReport<T, E> {
    /// Runs `op` on every item. A failure never stops the remaining items.
    pub fn collect<I, F>(items: impl IntoIterator<Item = I>, mut op: F) -> Self
    where
        F: FnMut(I) -> Result<T, E>,
    {
        let mut report = Self::default();
        for (index, item) in items.into_iter().enumerate() {
            match op(item) {
                Ok(value) => report.succeeded.push(value),
                Err(error) => report.failed.push(BatchFailure { index, error }),
            }
        }
        report
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}
