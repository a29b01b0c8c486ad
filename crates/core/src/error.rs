use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for socratic-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types shared by every socratic crate
#[derive(Debug, Error)]
pub enum Error {
    /// No saved conversation exists under the topic
    #[error("no saved chat named '{0}'")]
    NotFound(String),

    /// Empty topic or input where a value is required
    #[error("validation error: {0}")]
    Validation(String),

    /// Remote model call failed (network, quota, malformed response)
    #[error("gateway error: {0}")]
    Gateway(String),

    /// A local media file needed for rendering is missing
    #[error("asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    /// Session lifecycle errors
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Session-specific errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A chat is already running and has to be ended first
    #[error("chat '{0}' is still active; end it before starting another")]
    AlreadyActive(String),

    /// The operation needs an active chat
    #[error("no active chat; start or load one first")]
    NoActiveChat,
}
