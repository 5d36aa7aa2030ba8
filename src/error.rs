//! Error types for recobook operations.
//!
//! Every failure here is a caller precondition violation. Nothing is
//! retried or clamped internally; errors propagate to the caller as-is.

use thiserror::Error;

/// Main error type for recobook operations.
///
/// # Examples
///
/// ```
/// use recobook::error::RecommendError;
///
/// let err = RecommendError::index_out_of_range("user_factors", 7, 3);
/// assert!(err.to_string().contains("index 7"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// An identifier is absent from an index mapping.
    #[error("key not found: {key}")]
    KeyNotFound {
        /// The identifier that was looked up
        key: String,
    },

    /// An index lies outside a factor table's valid range.
    #[error("index {index} out of range for {table} (len={len})")]
    IndexOutOfRange {
        /// Name of the table being indexed
        table: String,
        /// The offending index
        index: usize,
        /// Number of rows in the table
        len: usize,
    },

    /// Empty, mismatched or non-finite input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the violation
        message: String,
    },

    /// Invalid hyperparameter value provided.
    #[error("invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },
}

impl RecommendError {
    /// Create a missing-key error.
    #[must_use]
    pub fn key_not_found(key: impl std::fmt::Display) -> Self {
        Self::KeyNotFound {
            key: key.to_string(),
        }
    }

    /// Create an index out of range error for the named table.
    #[must_use]
    pub fn index_out_of_range(table: &str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            table: table.to_string(),
            index,
            len,
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an invalid hyperparameter error.
    #[must_use]
    pub fn invalid_hyperparameter(
        param: &str,
        value: impl std::fmt::Display,
        constraint: &str,
    ) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, RecommendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_found_display() {
        let err = RecommendError::key_not_found("A2XYZ");
        assert_eq!(err.to_string(), "key not found: A2XYZ");
    }

    #[test]
    fn test_index_out_of_range_display() {
        let err = RecommendError::index_out_of_range("item_factors", 10, 5);
        let msg = err.to_string();
        assert!(msg.contains("index 10"));
        assert!(msg.contains("item_factors"));
        assert!(msg.contains("len=5"));
    }

    #[test]
    fn test_invalid_input_display() {
        let err = RecommendError::invalid_input("empty held-out split");
        assert!(err.to_string().contains("invalid input"));
        assert!(err.to_string().contains("empty held-out split"));
    }

    #[test]
    fn test_invalid_hyperparameter_display() {
        let err = RecommendError::invalid_hyperparameter("learning_rate", -0.1, "> 0");
        let msg = err.to_string();
        assert!(msg.contains("learning_rate"));
        assert!(msg.contains("-0.1"));
        assert!(msg.contains("> 0"));
    }

    #[test]
    fn test_error_is_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<RecommendError>();
    }
}
