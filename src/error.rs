use thiserror::Error;

/// Errors raised while constructing problem collaborators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Lower and upper bound vectors have different lengths.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// A lower bound exceeds its upper bound, or a bound is NaN.
    #[error("invalid bounds at index {index}: lower {lower} > upper {upper}")]
    InvalidBounds { index: usize, lower: f64, upper: f64 },

    /// A tolerance or step parameter is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}
