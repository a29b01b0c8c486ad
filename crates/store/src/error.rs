//! Error types for the transcript store

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the transcript store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No entry saved under the topic
    #[error("Saved chat not found: topic={topic}")]
    NotFound { topic: String },
}

impl Error {
    /// Create a not found error
    pub fn not_found(topic: impl Into<String>) -> Self {
        Self::NotFound { topic: topic.into() }
    }

    /// Topic the failed operation referred to
    pub fn topic(&self) -> &str {
        match self {
            Self::NotFound { topic } => topic,
        }
    }
}

impl From<Error> for socratic_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound { topic } => socratic_core::Error::NotFound(topic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("Sorting Basics");
        assert_eq!(err.to_string(), "Saved chat not found: topic=Sorting Basics");
        assert_eq!(err.topic(), "Sorting Basics");
    }

    #[test]
    fn test_error_into_core_error() {
        let err: socratic_core::Error = Error::not_found("Heaps").into();
        assert!(matches!(err, socratic_core::Error::NotFound(ref topic) if topic == "Heaps"));
    }
}
