//! Error taxonomy for polling sessions.
//!
//! Every failure a caller can observe is a [`TagError`]. Each variant maps
//! to one of the stable string codes listed in [`crate::constants`], which
//! hosts forward unchanged to the application.

use crate::constants::{
    CODE_COMMUNICATION, CODE_MALFORMED_INPUT, CODE_NO_SESSION, CODE_TIMEOUT, CODE_UNAVAILABLE,
    CODE_UNSUPPORTED,
};

/// Result type alias for tag operations.
pub type Result<T> = std::result::Result<T, TagError>;

/// Errors surfaced by polling, transceive and special UID reads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// Radio adapter is absent or switched off.
    #[error("NFC not available")]
    Unavailable,

    /// No tag was discovered within the poll window.
    #[error("Polling tag timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Operation is not valid for the bound technology, or a poll is
    /// already pending.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// No tag session is open.
    #[error("No tag polled")]
    NoSession,

    /// The pending poll was finished or detached before a tag appeared.
    #[error("Polling cancelled")]
    Cancelled,

    /// I/O failure while connecting to or exchanging data with the tag.
    #[error("Communication error: {message}")]
    Communication { message: String },

    /// Command bytes or hex input are not well formed.
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },
}

impl TagError {
    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::Communication {
            message: message.into(),
        }
    }

    /// Create a new malformed input error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Stable string code reported to the calling application.
    ///
    /// A cancelled poll reports `406`: once finished there is no session
    /// for the caller to use.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable => CODE_UNAVAILABLE,
            Self::Timeout { .. } => CODE_TIMEOUT,
            Self::Unsupported { .. } => CODE_UNSUPPORTED,
            Self::NoSession | Self::Cancelled => CODE_NO_SESSION,
            Self::Communication { .. } => CODE_COMMUNICATION,
            Self::MalformedInput { .. } => CODE_MALFORMED_INPUT,
        }
    }
}
