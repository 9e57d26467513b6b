//! Constants shared across the polling stack.
//!
//! # Error Codes
//!
//! Errors surfaced to the calling application carry a stable string code.
//! The codes mirror HTTP status semantics and must not change:
//!
//! | Code | Meaning |
//! |------|---------|
//! | `400` | Malformed command bytes or hex input |
//! | `404` | Radio adapter absent or disabled |
//! | `405` | Operation unsupported by the bound technology |
//! | `406` | No tag session open |
//! | `408` | Poll window elapsed without a tag |
//! | `500` | Communication failure with the tag |
//!
//! # Usage
//!
//! ```
//! use nfckit_core::constants::*;
//! use std::time::Duration;
//!
//! let timeout = Duration::from_millis(DEFAULT_POLL_TIMEOUT_MS);
//! assert_eq!(timeout.as_secs(), 20);
//! assert_eq!(SPECIAL_UID_COMMAND.len(), 5);
//! ```

// ============================================================================
// Polling
// ============================================================================

/// Default discovery window in milliseconds.
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 20_000;

// ============================================================================
// Standard labels
// ============================================================================

/// ISO 14443-4 over a Type A radio.
pub const STANDARD_ISO14443_4_A: &str = "ISO 14443-4 (Type A)";

/// ISO 14443-3 Type A (no ISO-DEP layer).
pub const STANDARD_ISO14443_3_A: &str = "ISO 14443-3 (Type A)";

/// ISO 14443-4 over a Type B radio.
pub const STANDARD_ISO14443_4_B: &str = "ISO 14443-4 (Type B)";

/// ISO 14443-3 Type B (no ISO-DEP layer).
pub const STANDARD_ISO14443_3_B: &str = "ISO 14443-3 (Type B)";

/// NFC-F / FeliCa.
pub const STANDARD_ISO18092: &str = "ISO 18092";

/// NFC-V vicinity cards.
pub const STANDARD_ISO15693: &str = "ISO 15693";

/// Tag exposing none of the known radio technologies.
pub const STANDARD_UNKNOWN: &str = "unknown";

// ============================================================================
// Special UID read (Type B identity cards)
// ============================================================================

/// Fixed command issued over a bare Type B technology to read the card's
/// proprietary UID.
pub const SPECIAL_UID_COMMAND: [u8; 5] = [0x00, 0x36, 0x00, 0x00, 0x08];

/// Number of response bytes returned from the special UID read.
pub const SPECIAL_UID_LENGTH: usize = 8;

// ============================================================================
// Command APDU framing (ISO 7816-4)
// ============================================================================

/// CLA INS P1 P2.
pub const APDU_HEADER_LENGTH: usize = 4;

// ============================================================================
// Caller-facing error codes
// ============================================================================

/// Malformed input.
pub const CODE_MALFORMED_INPUT: &str = "400";

/// Adapter unavailable or disabled.
pub const CODE_UNAVAILABLE: &str = "404";

/// Unsupported for the bound technology.
pub const CODE_UNSUPPORTED: &str = "405";

/// No tag session open.
pub const CODE_NO_SESSION: &str = "406";

/// Poll timeout.
pub const CODE_TIMEOUT: &str = "408";

/// Communication error.
pub const CODE_COMMUNICATION: &str = "500";
