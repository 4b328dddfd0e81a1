//! Error types shared across the QUORUM runtime.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type QuorumResult<T> = Result<T, QuorumError>;

/// Errors raised by the QUORUM runtime.
///
/// Configuration problems are deliberately *not* represented here in
/// most code paths: per the controller's error policy, a malformed or
/// missing config value is replaced with a documented default and the
/// system keeps running. `Config` is reserved for situations where no
/// sensible default exists (e.g. an unreadable config file requested
/// explicitly by the user).
#[derive(Debug, Error)]
pub enum QuorumError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown behavior: {0}")]
    UnknownBehavior(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuorumError {
    /// Create a configuration error from anything string-like.
    pub fn config(msg: impl Into<String>) -> Self {
        QuorumError::Config(msg.into())
    }
}
