//! Property-based tests for the hex codec.
//!
//! Every byte sequence must survive encode → decode unchanged, and the
//! encoded form must be lowercase so identities compare as plain strings.

use nfckit_core::codec;
use proptest::prelude::*;

/// Byte sequences biased towards the edge values 0x00 and 0xFF.
fn edge_heavy_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop_oneof![Just(0x00u8), Just(0xFFu8), any::<u8>()], 0..64)
}

proptest! {
    #[test]
    fn prop_hex_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let encoded = codec::encode(&bytes);
        prop_assert_eq!(encoded.len(), bytes.len() * 2);
        prop_assert_eq!(codec::decode(&encoded).unwrap(), bytes);
    }

    #[test]
    fn prop_hex_roundtrip_edge_values(bytes in edge_heavy_bytes()) {
        prop_assert_eq!(codec::decode(&codec::encode(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn prop_encoding_is_lowercase(bytes in prop::collection::vec(any::<u8>(), 1..64)) {
        let encoded = codec::encode(&bytes);
        prop_assert_eq!(encoded.clone(), encoded.to_lowercase());
    }

    #[test]
    fn prop_uppercase_input_decodes(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let upper = codec::encode(&bytes).to_uppercase();
        prop_assert_eq!(codec::decode(&upper).unwrap(), bytes);
    }
}

#[test]
fn test_empty_sequence_roundtrip() {
    assert_eq!(codec::encode(&[]), "");
    assert!(codec::decode("").unwrap().is_empty());
}
