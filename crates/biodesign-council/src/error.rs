//! Error types for the expert council.
//!
//! Model replies never produce errors here (bad output is salvaged by the
//! parser). Errors come from the model boundary itself or from
//! configuration checked at construction.

use biodesign_scoring::ScoringError;
use thiserror::Error;

use crate::stage::Stage;

/// Errors raised by a [`crate::LanguageModel`] implementation.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The request could not be sent or timed out.
    #[error("Model request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("Model provider returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The provider response did not have the expected shape.
    #[error("Model response could not be decoded: {0}")]
    Decode(String),

    /// The provider returned no completion text.
    #[error("Model returned an empty completion")]
    EmptyCompletion,

    /// No API key was supplied.
    #[error("API key not configured (expected in {0})")]
    MissingApiKey(String),
}

impl ModelError {
    /// Whether retrying the same request may succeed.
    ///
    /// Transport failures, rate limiting (429) and server errors (5xx)
    /// are transient; everything else is not.
    pub fn is_transient(&self) -> bool {
        match self {
            ModelError::Request(_) => true,
            ModelError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Errors that abort a debate run or its construction.
#[derive(Debug, Error)]
pub enum DebateError {
    /// Configuration is out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Weight table or dispute threshold rejected.
    #[error("Scoring configuration error: {0}")]
    Scoring(#[from] ScoringError),

    /// A model call failed and was not tolerated.
    #[error("{stage} invocation for '{role}' failed: {source}")]
    Invocation {
        /// Stage in which the call was made.
        stage: Stage,
        /// Role code, or `moderator` for consolidated calls.
        role: String,
        /// Underlying model error.
        #[source]
        source: ModelError,
    },
}
