//! Explainability error types.

use thiserror::Error;

/// Errors raised while building the importance ranking. They never leave
/// `ImportanceRanker::rank`, which turns them into an empty ranking.
#[derive(Debug, Error)]
pub enum ExplainError {
    /// Not enough complete rows to fit the model
    #[error("insufficient data: need {required} complete rows, got {actual}")]
    InsufficientData {
        /// Required number of rows.
        required: usize,
        /// Rows available after dropping incomplete ones.
        actual: usize,
    },

    /// Input that cannot be standardized or fitted (empty, ragged, non-finite)
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// Model fitting error
    #[error("model fitting failed: {0}")]
    ModelFitting(String),
}

impl ExplainError {
    /// Creates a `DegenerateInput` error with a message.
    #[must_use]
    pub fn degenerate(msg: impl Into<String>) -> Self {
        ExplainError::DegenerateInput(msg.into())
    }

    /// Creates a `ModelFitting` error with a message.
    #[must_use]
    pub fn fitting(msg: impl Into<String>) -> Self {
        ExplainError::ModelFitting(msg.into())
    }
}
