//! Error types for adapter and tag technology operations.
//!
//! These errors describe what went wrong inside the radio driver. They are
//! converted into the caller-facing [`TagError`] at the session boundary.

use nfckit_core::TagError;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while driving the radio or a tag technology.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Tag left the field or the adapter went away.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Radio operation timed out after specified duration.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Operation is not supported by this technology or adapter.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// Technology used before `connect()`.
    #[error("Technology not connected")]
    NotConnected,

    /// Tag communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Driver rejected the data handed to it.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

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
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }
}

impl From<HardwareError> for TagError {
    fn from(error: HardwareError) -> Self {
        match error {
            HardwareError::Unsupported { operation } => TagError::unsupported(operation),
            HardwareError::InvalidData { message } => TagError::malformed(message),
            HardwareError::CommunicationError { message } => TagError::communication(message),
            other => TagError::communication(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("IsoDep");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: IsoDep");
    }

    #[test]
    fn test_timeout_error() {
        let error = HardwareError::timeout(618);
        assert_eq!(error.to_string(), "Operation timeout after 618ms");
    }

    #[test]
    fn test_io_errors_become_communication() {
        let error: TagError = HardwareError::disconnected("Tag was lost").into();
        assert!(matches!(error, TagError::Communication { .. }));
        assert_eq!(error.code(), "500");

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "transceive failed");
        let error: TagError = HardwareError::from(io).into();
        assert_eq!(error.code(), "500");
    }

    #[test]
    fn test_communication_message_is_not_wrapped_twice() {
        let error: TagError = HardwareError::communication("Activation failed").into();
        assert_eq!(error, TagError::communication("Activation failed"));
        assert_eq!(error.to_string(), "Communication error: Activation failed");
    }

    #[test]
    fn test_invalid_data_becomes_malformed_input() {
        let error: TagError = HardwareError::invalid_data("APDU too long").into();
        assert_eq!(error, TagError::malformed("APDU too long"));
    }

    #[test]
    fn test_unsupported_is_preserved() {
        let error: TagError = HardwareError::unsupported("extended length").into();
        assert_eq!(error.code(), "405");
    }
}
