//! Unified error type for mirror synchronization
//!
//! Every failure the engine can report falls into one of four buckets. Errors
//! raised while an event is being applied are never swallowed: they propagate
//! out of the notifier's dispatch so the code that mutated the source can see
//! that the mirror is no longer trustworthy.

use serde::{Deserialize, Serialize};

/// Error type for all mirror operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum MirrorError {
    /// A required argument was missing or malformed
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message describing the invalid argument
        message: String,
    },

    /// A change event does not line up with the current target state
    #[error("Consistency violation: {message}")]
    ConsistencyViolation {
        /// Error message describing the desynchronization
        message: String,
    },

    /// The selector failed for an item that passed the filter
    #[error("Transform failure: {message}")]
    TransformFailure {
        /// Error message reported by the selector
        message: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },
}

impl MirrorError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a consistency violation error
    pub fn consistency(message: impl Into<String>) -> Self {
        Self::ConsistencyViolation {
            message: message.into(),
        }
    }

    /// Create a transform failure error
    pub fn transform(message: impl Into<String>) -> Self {
        Self::TransformFailure {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create the error raised when an event position falls outside the target
    pub fn index_out_of_bounds(index: usize, len: usize, operation: &'static str) -> Self {
        Self::consistency(format!(
            "{operation} at index {index} out of bounds for target length {len}"
        ))
    }

    /// Whether this error means the target no longer mirrors the source
    pub fn is_desynchronized(&self) -> bool {
        matches!(
            self,
            Self::ConsistencyViolation { .. } | Self::TransformFailure { .. }
        )
    }
}

/// Standard Result type for mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

impl From<toml::de::Error> for MirrorError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}

impl From<std::io::Error> for MirrorError {
    fn from(err: std::io::Error) -> Self {
        Self::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = MirrorError::invalid_argument("target is required");
        assert!(matches!(err, MirrorError::InvalidArgument { .. }));
        assert_eq!(err.to_string(), "Invalid argument: target is required");
    }

    #[test]
    fn test_index_out_of_bounds_message() {
        let err = MirrorError::index_out_of_bounds(5, 3, "remove");
        let msg = format!("{err}");
        assert!(msg.contains("remove"));
        assert!(msg.contains('5'));
        assert!(msg.contains('3'));
        assert!(err.is_desynchronized());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.toml");
        let err = MirrorError::from(io_err);
        assert!(matches!(err, MirrorError::Config { .. }));
        assert!(!err.is_desynchronized());
    }
}
