//! Command APDU framing checks (ISO 7816-4).
//!
//! Only the frame layout is validated. CLA/INS values are forwarded as
//! given, so proprietary instructions pass through untouched.

use nfckit_core::constants::APDU_HEADER_LENGTH;
use nfckit_core::{Result, TagError};

/// Layout of a well-formed command APDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApduCase {
    /// Header only.
    Case1,
    /// Header + Le.
    Case2 { extended: bool },
    /// Header + Lc + data.
    Case3 { extended: bool },
    /// Header + Lc + data + Le.
    Case4 { extended: bool },
}

/// Check that `command` is a complete command APDU and report its case.
///
/// # Examples
///
/// ```
/// use nfckit_session::apdu::{ApduCase, validate};
///
/// // SELECT by AID, short case 4
/// let select = [0x00, 0xA4, 0x04, 0x00, 0x02, 0x3F, 0x00, 0x00];
/// assert_eq!(validate(&select).unwrap(), ApduCase::Case4 { extended: false });
///
/// assert!(validate(&[0x00, 0xA4]).is_err());
/// ```
pub fn validate(command: &[u8]) -> Result<ApduCase> {
    if command.len() < APDU_HEADER_LENGTH {
        return Err(TagError::malformed(format!(
            "APDU shorter than header ({} bytes)",
            command.len()
        )));
    }

    let body = &command[APDU_HEADER_LENGTH..];
    match body {
        [] => Ok(ApduCase::Case1),
        [_le] => Ok(ApduCase::Case2 { extended: false }),
        [0x00, rest @ ..] if !rest.is_empty() => validate_extended(rest),
        [lc, rest @ ..] => {
            let lc = usize::from(*lc);
            match rest.len() {
                n if n == lc => Ok(ApduCase::Case3 { extended: false }),
                n if n == lc + 1 => Ok(ApduCase::Case4 { extended: false }),
                n => Err(TagError::malformed(format!(
                    "Lc announces {lc} data bytes, {n} follow"
                ))),
            }
        }
    }
}

// `rest` follows the leading 0x00 marker of an extended length field.
fn validate_extended(rest: &[u8]) -> Result<ApduCase> {
    let [hi, lo, data @ ..] = rest else {
        return Err(TagError::malformed("truncated extended length field"));
    };
    let length = usize::from(u16::from_be_bytes([*hi, *lo]));

    if data.is_empty() {
        return Ok(ApduCase::Case2 { extended: true });
    }
    if length == 0 {
        return Err(TagError::malformed("extended Lc must be between 1 and 65535"));
    }

    match data.len() {
        n if n == length => Ok(ApduCase::Case3 { extended: true }),
        n if n == length + 2 => Ok(ApduCase::Case4 { extended: true }),
        n => Err(TagError::malformed(format!(
            "extended Lc announces {length} data bytes, {n} follow"
        ))),
    }
}
