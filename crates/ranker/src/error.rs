// ABOUTME: Error types for the watchfeed ranking engine.
// ABOUTME: Provides RankerError covering caller contract violations and bad rule patterns.

use thiserror::Error;

/// Errors surfaced at the engine boundary.
///
/// The pipeline itself has no external failure modes (no I/O); these cover
/// caller contract violations and malformed filter rules.
#[derive(Debug, Error)]
pub enum RankerError {
    /// Backlog ratio outside [0, 1] (or NaN).
    #[error("backlog ratio must be within [0, 1], got {0}")]
    BacklogRatioOutOfRange(f64),

    /// Max-consecutive-from-source must be at least 1.
    #[error("max consecutive items from one source must be at least 1")]
    MaxConsecutiveZero,

    /// A wildcard keyword pattern failed to compile.
    #[error("invalid wildcard keyword pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl RankerError {
    /// Creates a BacklogRatioOutOfRange error.
    pub fn backlog_ratio(value: f64) -> Self {
        RankerError::BacklogRatioOutOfRange(value)
    }

    /// Creates an InvalidPattern error for a wildcard keyword.
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        RankerError::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }
}
