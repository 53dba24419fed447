//! Error types for session operations.

/// Error type for session store and manager operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No session is stored under the token.
    #[error("Session not found: {0}")]
    NotFound(String),

    /// The secure random source could not produce a token.
    #[error("Token generation failed: {0}")]
    Generation(String),

    /// Error from the storage backend.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid manager configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
