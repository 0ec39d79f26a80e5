//! Error types for scoring configuration.
//!
//! Scoring itself never fails on model output; these errors only
//! surface when the weight table or thresholds are misconfigured.

use thiserror::Error;

use crate::criteria::Criterion;

/// Errors raised while validating scoring configuration.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The criterion weights do not add up to 1.0.
    #[error("criterion weights sum to {sum:.4}, expected 1.0 (±{tolerance})")]
    WeightSum {
        /// Actual sum of all weights.
        sum: f64,
        /// Accepted deviation from 1.0.
        tolerance: f64,
    },

    /// A single weight lies outside `[0, 1]` or is not a number.
    #[error("weight for {criterion} must lie within [0, 1], got {weight}")]
    InvalidWeight {
        /// Criterion carrying the bad weight.
        criterion: Criterion,
        /// The rejected weight.
        weight: f64,
    },

    /// A criterion code outside the closed set.
    #[error("unknown criterion code: {0}")]
    UnknownCriterion(String),

    /// Dispute threshold is negative or not finite.
    #[error("dispute threshold must be finite and non-negative, got {0}")]
    InvalidThreshold(f64),
}
