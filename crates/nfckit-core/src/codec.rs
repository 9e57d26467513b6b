//! Hex codec used at every boundary crossing.
//!
//! Command and response bytes cross the caller boundary as hex strings.
//! Encoding always yields lowercase; decoding accepts either case.
//!
//! # Examples
//!
//! ```
//! use nfckit_core::codec;
//!
//! let bytes = codec::decode("00A4040007A0000002471001").unwrap();
//! assert_eq!(bytes.len(), 12);
//! assert_eq!(codec::encode(&bytes), "00a4040007a0000002471001");
//!
//! assert!(codec::decode("0A4").is_err());
//! ```

use crate::error::{Result, TagError};

/// Encode bytes as a lowercase hex string.
pub fn encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode a hex string into bytes.
///
/// # Errors
///
/// Returns [`TagError::MalformedInput`] if the string has odd length or
/// contains a non-hex character.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    hex::decode(input).map_err(|e| TagError::malformed(format!("invalid hex '{input}': {e}")))
}

/// Encode a single byte, e.g. the SAK or DSFID.
pub fn encode_byte(byte: u8) -> String {
    encode(&[byte])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[], "")]
    #[case(&[0x00], "00")]
    #[case(&[0xFF], "ff")]
    #[case(&[0x04, 0xA2, 0xB3, 0xC4], "04a2b3c4")]
    fn test_encode(#[case] bytes: &[u8], #[case] expected: &str) {
        assert_eq!(encode(bytes), expected);
    }

    #[test]
    fn test_decode_accepts_both_cases() {
        assert_eq!(decode("04A2b3C4").unwrap(), vec![0x04, 0xA2, 0xB3, 0xC4]);
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[rstest]
    #[case("0")]
    #[case("abc")]
    #[case("zz")]
    #[case("00 11")]
    fn test_decode_rejects_malformed(#[case] input: &str) {
        let err = decode(input).unwrap_err();
        assert!(matches!(err, TagError::MalformedInput { .. }));
        assert_eq!(err.code(), "400");
    }

    #[test]
    fn test_encode_byte() {
        assert_eq!(encode_byte(0x08), "08");
        assert_eq!(encode_byte(0xAB), "ab");
    }
}
