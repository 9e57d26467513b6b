//! Tag classification.
//!
//! Maps the capability set of a discovered tag to a [`TagIdentity`] and,
//! when the tag offers a command channel, to the technology the session
//! binds. Precedence is fixed; the first matching rule wins:
//!
//! | Capabilities | Type | Standard | Binding |
//! |---|---|---|---|
//! | NfcA + IsoDep | `iso7816` | ISO 14443-4 (Type A) | IsoDep |
//! | NfcA + MifareClassic | `mifare_classic` | ISO 14443-3 (Type A) | - |
//! | NfcA + MifareUltralight | `mifare_ultralight` | ISO 14443-3 (Type A) | - |
//! | NfcA | `unknown` | ISO 14443-3 (Type A) | - |
//! | NfcB + IsoDep | `iso7816` | ISO 14443-4 (Type B) | IsoDep |
//! | NfcB | `unknown` | ISO 14443-3 (Type B) | NfcB |
//! | NfcF | `felica` | ISO 18092 | - |
//! | NfcV | `iso15693` | ISO 15693 | - |
//! | anything else | `unknown` | unknown | - |

use nfckit_core::codec;
use nfckit_core::constants::{
    STANDARD_ISO14443_3_A, STANDARD_ISO14443_3_B, STANDARD_ISO14443_4_A, STANDARD_ISO14443_4_B,
    STANDARD_ISO15693, STANDARD_ISO18092, STANDARD_UNKNOWN,
};
use nfckit_core::{StandardMetadata, TagIdentity, TagType};
use nfckit_hardware::types::{Capability, IsoDepInfo, NfcAInfo, NfcBInfo, NfcFInfo, NfcVInfo};
use nfckit_hardware::{RawTag, TechKind};

/// Technology a [`TagSession`](crate::TagSession) exchanges commands through.
#[derive(Debug)]
pub enum TechBinding<T> {
    /// ISO 14443-4 channel, carries APDUs.
    IsoDep(T),
    /// Bare ISO 14443-3 Type B channel, used for the special UID read.
    NfcB(T),
}

impl<T> TechBinding<T> {
    pub fn kind(&self) -> TechKind {
        match self {
            Self::IsoDep(_) => TechKind::IsoDep,
            Self::NfcB(_) => TechKind::NfcB,
        }
    }

    pub fn technology_mut(&mut self) -> &mut T {
        match self {
            Self::IsoDep(tech) | Self::NfcB(tech) => tech,
        }
    }

    pub fn into_technology(self) -> T {
        match self {
            Self::IsoDep(tech) | Self::NfcB(tech) => tech,
        }
    }
}

/// Result of classifying one discovered tag.
#[derive(Debug)]
pub struct Classification<T> {
    pub identity: TagIdentity,
    pub binding: Option<TechBinding<T>>,
}

/// Which precedence rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    IsoDepA,
    ClassicA,
    UltralightA,
    PlainA,
    IsoDepB,
    PlainB,
    Felica,
    Vicinity,
    Unknown,
}

fn match_rule<T>(tag: &RawTag<T>) -> Rule {
    if tag.has(TechKind::NfcA) {
        if tag.has(TechKind::IsoDep) {
            Rule::IsoDepA
        } else if tag.has(TechKind::MifareClassic) {
            Rule::ClassicA
        } else if tag.has(TechKind::MifareUltralight) {
            Rule::UltralightA
        } else {
            Rule::PlainA
        }
    } else if tag.has(TechKind::NfcB) {
        if tag.has(TechKind::IsoDep) {
            Rule::IsoDepB
        } else {
            Rule::PlainB
        }
    } else if tag.has(TechKind::NfcF) {
        Rule::Felica
    } else if tag.has(TechKind::NfcV) {
        Rule::Vicinity
    } else {
        Rule::Unknown
    }
}

fn nfc_a<T>(tag: &RawTag<T>) -> Option<&NfcAInfo> {
    tag.capabilities.iter().find_map(|c| match c {
        Capability::NfcA(info) => Some(info),
        _ => None,
    })
}

fn nfc_b<T>(tag: &RawTag<T>) -> Option<&NfcBInfo> {
    tag.capabilities.iter().find_map(|c| match c {
        Capability::NfcB(info, _) => Some(info),
        _ => None,
    })
}

fn nfc_f<T>(tag: &RawTag<T>) -> Option<&NfcFInfo> {
    tag.capabilities.iter().find_map(|c| match c {
        Capability::NfcF(info) => Some(info),
        _ => None,
    })
}

fn nfc_v<T>(tag: &RawTag<T>) -> Option<&NfcVInfo> {
    tag.capabilities.iter().find_map(|c| match c {
        Capability::NfcV(info) => Some(info),
        _ => None,
    })
}

fn iso_dep<T>(tag: &RawTag<T>) -> Option<&IsoDepInfo> {
    tag.capabilities.iter().find_map(|c| match c {
        Capability::IsoDep(info, _) => Some(info),
        _ => None,
    })
}

fn hex_opt(bytes: Option<&[u8]>) -> String {
    bytes.map(codec::encode).unwrap_or_default()
}

fn fill_type_a<T>(tag: &RawTag<T>, metadata: &mut StandardMetadata) {
    if let Some(info) = nfc_a(tag) {
        metadata.atqa = codec::encode(&info.atqa);
        metadata.sak = codec::encode_byte(info.sak);
    }
}

fn fill_type_b<T>(tag: &RawTag<T>, metadata: &mut StandardMetadata) {
    if let Some(info) = nfc_b(tag) {
        metadata.protocol_info = codec::encode(&info.protocol_info);
        metadata.application_data = codec::encode(&info.application_data);
    }
}

fn describe<T>(tag: &RawTag<T>, rule: Rule) -> TagIdentity {
    let mut metadata = StandardMetadata::default();

    let (tag_type, standard) = match rule {
        Rule::IsoDepA => {
            fill_type_a(tag, &mut metadata);
            metadata.historical_bytes =
                hex_opt(iso_dep(tag).and_then(|i| i.historical_bytes.as_deref()));
            (TagType::Iso7816, STANDARD_ISO14443_4_A)
        }
        Rule::ClassicA => {
            fill_type_a(tag, &mut metadata);
            (TagType::MifareClassic, STANDARD_ISO14443_3_A)
        }
        Rule::UltralightA => {
            fill_type_a(tag, &mut metadata);
            (TagType::MifareUltralight, STANDARD_ISO14443_3_A)
        }
        Rule::PlainA => {
            fill_type_a(tag, &mut metadata);
            (TagType::Unknown, STANDARD_ISO14443_3_A)
        }
        Rule::IsoDepB => {
            fill_type_b(tag, &mut metadata);
            metadata.hi_layer_response =
                hex_opt(iso_dep(tag).and_then(|i| i.hi_layer_response.as_deref()));
            (TagType::Iso7816, STANDARD_ISO14443_4_B)
        }
        Rule::PlainB => {
            fill_type_b(tag, &mut metadata);
            (TagType::Unknown, STANDARD_ISO14443_3_B)
        }
        Rule::Felica => {
            if let Some(info) = nfc_f(tag) {
                metadata.manufacturer = codec::encode(&info.manufacturer);
                metadata.system_code = codec::encode(&info.system_code);
            }
            (TagType::Felica, STANDARD_ISO18092)
        }
        Rule::Vicinity => {
            if let Some(info) = nfc_v(tag) {
                metadata.dsf_id = codec::encode_byte(info.dsf_id);
            }
            (TagType::Iso15693, STANDARD_ISO15693)
        }
        Rule::Unknown => (TagType::Unknown, STANDARD_UNKNOWN),
    };

    TagIdentity {
        tag_type,
        standard,
        id: tag.id.clone(),
        metadata,
    }
}

/// Derive the identity of a tag without taking its technologies.
pub fn identify<T>(tag: &RawTag<T>) -> TagIdentity {
    describe(tag, match_rule(tag))
}

/// Classify a tag, consuming it.
///
/// Technologies that are not bound are dropped here, releasing them.
///
/// # Examples
///
/// ```
/// use nfckit_core::TagType;
/// use nfckit_hardware::mock::MockTechnology;
/// use nfckit_hardware::types::{NfcBInfo, RawTag};
/// use nfckit_hardware::TechKind;
/// use nfckit_session::classifier::classify;
///
/// let tag = RawTag::builder(vec![0x11, 0x22, 0x33, 0x44])
///     .nfc_b(
///         NfcBInfo { protocol_info: vec![0x00, 0x81, 0x81], application_data: vec![0x00; 4] },
///         MockTechnology::nfc_b(),
///     )
///     .build();
///
/// let classification = classify(tag);
/// assert_eq!(classification.identity.tag_type, TagType::Unknown);
/// assert_eq!(classification.identity.metadata.protocol_info, "008181");
/// assert_eq!(classification.binding.map(|b| b.kind()), Some(TechKind::NfcB));
/// ```
pub fn classify<T>(tag: RawTag<T>) -> Classification<T> {
    let rule = match_rule(&tag);
    let identity = describe(&tag, rule);

    let binding = match rule {
        Rule::IsoDepA | Rule::IsoDepB => tag.capabilities.into_iter().find_map(|c| match c {
            Capability::IsoDep(_, tech) => Some(TechBinding::IsoDep(tech)),
            _ => None,
        }),
        Rule::PlainB => tag.capabilities.into_iter().find_map(|c| match c {
            Capability::NfcB(_, tech) => Some(TechBinding::NfcB(tech)),
            _ => None,
        }),
        _ => None,
    };

    Classification { identity, binding }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfckit_hardware::mock::MockTechnology;
    use nfckit_hardware::types::RawTagBuilder;
    use rstest::rstest;

    const UID: [u8; 4] = [0x04, 0xA2, 0xB3, 0xC4];

    fn type_a() -> NfcAInfo {
        NfcAInfo {
            atqa: vec![0x00, 0x04],
            sak: 0x08,
        }
    }

    fn type_b() -> NfcBInfo {
        NfcBInfo {
            protocol_info: vec![0x00, 0x81, 0x81],
            application_data: vec![0xDE, 0xAD, 0xBE, 0xEF],
        }
    }

    fn felica() -> NfcFInfo {
        NfcFInfo {
            manufacturer: vec![0x03, 0x32],
            system_code: vec![0x88, 0xB4],
        }
    }

    fn builder() -> RawTagBuilder<MockTechnology> {
        RawTag::builder(UID.to_vec())
    }

    fn iso_dep_a() -> IsoDepInfo {
        IsoDepInfo {
            historical_bytes: Some(vec![0x80, 0x31]),
            hi_layer_response: None,
        }
    }

    fn iso_dep_b() -> IsoDepInfo {
        IsoDepInfo {
            historical_bytes: None,
            hi_layer_response: Some(vec![0x12]),
        }
    }

    fn type_a_metadata() -> StandardMetadata {
        StandardMetadata {
            atqa: "0004".into(),
            sak: "08".into(),
            ..Default::default()
        }
    }

    fn type_b_metadata() -> StandardMetadata {
        StandardMetadata {
            protocol_info: "008181".into(),
            application_data: "deadbeef".into(),
            ..Default::default()
        }
    }

    #[rstest]
    #[case::a_iso_dep(
        builder().nfc_a(type_a()).iso_dep(iso_dep_a(), MockTechnology::iso_dep()),
        TagType::Iso7816,
        STANDARD_ISO14443_4_A,
        StandardMetadata { historical_bytes: "8031".into(), ..type_a_metadata() },
        Some(TechKind::IsoDep)
    )]
    #[case::a_classic(
        builder().nfc_a(type_a()).mifare_classic(),
        TagType::MifareClassic,
        STANDARD_ISO14443_3_A,
        type_a_metadata(),
        None
    )]
    #[case::a_ultralight(
        builder().nfc_a(type_a()).mifare_ultralight(),
        TagType::MifareUltralight,
        STANDARD_ISO14443_3_A,
        type_a_metadata(),
        None
    )]
    #[case::a_plain(
        builder().nfc_a(type_a()),
        TagType::Unknown,
        STANDARD_ISO14443_3_A,
        type_a_metadata(),
        None
    )]
    #[case::b_iso_dep(
        builder()
            .nfc_b(type_b(), MockTechnology::nfc_b())
            .iso_dep(iso_dep_b(), MockTechnology::iso_dep()),
        TagType::Iso7816,
        STANDARD_ISO14443_4_B,
        StandardMetadata { hi_layer_response: "12".into(), ..type_b_metadata() },
        Some(TechKind::IsoDep)
    )]
    #[case::b_plain(
        builder().nfc_b(type_b(), MockTechnology::nfc_b()),
        TagType::Unknown,
        STANDARD_ISO14443_3_B,
        type_b_metadata(),
        Some(TechKind::NfcB)
    )]
    #[case::f(
        builder().nfc_f(felica()),
        TagType::Felica,
        STANDARD_ISO18092,
        StandardMetadata {
            manufacturer: "0332".into(),
            system_code: "88b4".into(),
            ..Default::default()
        },
        None
    )]
    #[case::v(
        builder().nfc_v(NfcVInfo { dsf_id: 0x00 }),
        TagType::Iso15693,
        STANDARD_ISO15693,
        StandardMetadata { dsf_id: "00".into(), ..Default::default() },
        None
    )]
    #[case::none(
        builder().other("NfcBarcode"),
        TagType::Unknown,
        STANDARD_UNKNOWN,
        StandardMetadata::default(),
        None
    )]
    fn test_classification_table(
        #[case] tag: RawTagBuilder<MockTechnology>,
        #[case] tag_type: TagType,
        #[case] standard: &str,
        #[case] metadata: StandardMetadata,
        #[case] binding: Option<TechKind>,
    ) {
        let classification = classify(tag.build());

        assert_eq!(classification.identity.tag_type, tag_type);
        assert_eq!(classification.identity.standard, standard);
        assert_eq!(classification.identity.id, UID.to_vec());
        assert_eq!(classification.identity.metadata, metadata);
        assert_eq!(classification.binding.map(|b| b.kind()), binding);
    }

    #[test]
    fn test_iso_dep_a_metadata() {
        let identity = identify(
            &builder()
                .nfc_a(type_a())
                .iso_dep(iso_dep_a(), MockTechnology::iso_dep())
                .build(),
        );

        assert_eq!(
            identity.metadata,
            StandardMetadata {
                atqa: "0004".into(),
                sak: "08".into(),
                historical_bytes: "8031".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_iso_dep_b_metadata() {
        let identity = identify(
            &builder()
                .nfc_b(type_b(), MockTechnology::nfc_b())
                .iso_dep(iso_dep_b(), MockTechnology::iso_dep())
                .build(),
        );

        assert_eq!(
            identity.metadata,
            StandardMetadata {
                protocol_info: "008181".into(),
                application_data: "deadbeef".into(),
                hi_layer_response: "12".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_felica_metadata_only() {
        let identity = identify(&builder().nfc_f(felica()).build());

        assert_eq!(
            identity.metadata,
            StandardMetadata {
                manufacturer: "0332".into(),
                system_code: "88b4".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_vicinity_metadata_only() {
        let identity = identify(&builder().nfc_v(NfcVInfo { dsf_id: 0x0A }).build());

        assert_eq!(identity.metadata.dsf_id, "0a");
        assert!(identity.metadata.atqa.is_empty());
        assert!(identity.metadata.manufacturer.is_empty());
    }

    #[test]
    fn test_type_a_wins_over_type_b() {
        let identity = identify(
            &builder()
                .nfc_b(type_b(), MockTechnology::nfc_b())
                .nfc_a(type_a())
                .mifare_classic()
                .build(),
        );

        assert_eq!(identity.tag_type, TagType::MifareClassic);
        assert!(identity.metadata.protocol_info.is_empty());
    }

    #[test]
    fn test_iso_dep_without_historical_bytes() {
        let identity = identify(
            &builder()
                .nfc_a(type_a())
                .iso_dep(IsoDepInfo::default(), MockTechnology::iso_dep())
                .build(),
        );

        assert_eq!(identity.tag_type, TagType::Iso7816);
        assert_eq!(identity.metadata.historical_bytes, "");
    }

    #[test]
    fn test_identify_matches_classify() {
        let tag = builder()
            .nfc_a(type_a())
            .iso_dep(iso_dep_a(), MockTechnology::iso_dep())
            .build();

        let identity = identify(&tag);
        assert_eq!(classify(tag).identity, identity);
    }

    #[test]
    fn test_iso_dep_ignored_without_type_a_or_b() {
        let classification = classify(
            builder()
                .nfc_f(felica())
                .iso_dep(IsoDepInfo::default(), MockTechnology::iso_dep())
                .build(),
        );

        assert_eq!(classification.identity.tag_type, TagType::Felica);
        assert!(classification.binding.is_none());
    }
}
