//! Error types for agrupar operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for agrupar operations.
///
/// Provides detailed context about failures including dimension mismatches,
/// invalid hyperparameters, and degenerate statistical inputs.
///
/// # Examples
///
/// ```
/// use agrupar::error::AgruparError;
///
/// let err = AgruparError::InvalidHyperparameter {
///     param: "eps".to_string(),
///     value: "-1".to_string(),
///     constraint: "> 0".to_string(),
/// };
/// assert!(err.to_string().contains("eps"));
/// ```
#[derive(Debug)]
pub enum AgruparError {
    /// Matrix/vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Input contains no points/records.
    EmptyInput {
        /// What was empty
        context: String,
    },

    /// Dataset is too small for the requested computation.
    InsufficientPoints {
        /// Minimum number of points required
        needed: usize,
        /// Number of points available
        available: usize,
    },

    /// Contingency table degenerated to a single row or column; no
    /// independence test can be computed.
    DegenerateTable {
        /// Why the table is degenerate
        reason: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for AgruparError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgruparError::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected {expected}, got {actual}")
            }
            AgruparError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            AgruparError::EmptyInput { context } => {
                write!(f, "empty input: {context}")
            }
            AgruparError::InsufficientPoints { needed, available } => {
                write!(
                    f,
                    "insufficient points: need at least {needed}, have {available}"
                )
            }
            AgruparError::DegenerateTable { reason } => {
                write!(f, "degenerate contingency table: {reason}")
            }
            AgruparError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for AgruparError {}

impl From<&str> for AgruparError {
    fn from(msg: &str) -> Self {
        AgruparError::Other(msg.to_string())
    }
}

impl From<String> for AgruparError {
    fn from(msg: String) -> Self {
        AgruparError::Other(msg)
    }
}

impl AgruparError {
    /// Create an invalid-hyperparameter error with descriptive context.
    #[must_use]
    pub fn invalid_hyperparameter(param: &str, value: impl fmt::Display, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// Create an empty-input error.
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::EmptyInput {
            context: context.to_string(),
        }
    }
}

#[allow(clippy::cmp_owned)]
impl PartialEq<&str> for AgruparError {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, AgruparError>;
