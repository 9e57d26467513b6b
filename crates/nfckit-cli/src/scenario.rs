//! Scripted tags the CLI brings into the mock field.

use clap::ValueEnum;
use nfckit_hardware::mock::MockTechnology;
use nfckit_hardware::types::{IsoDepInfo, NfcAInfo, NfcBInfo, NfcFInfo, NfcVInfo, RawTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// ISO 14443-4 Type A smart card.
    IsoDepA,
    /// ISO 14443-4 Type B smart card.
    IsoDepB,
    /// Bare Type B card answering the special UID read.
    TypeB,
    /// MIFARE Classic 1K.
    Classic,
    /// MIFARE Ultralight.
    Ultralight,
    /// FeliCa card.
    Felica,
    /// ISO 15693 label.
    Vicinity,
    /// Nothing enters the field; the poll times out.
    Empty,
}

impl Scenario {
    /// Build the tag for this scenario.
    ///
    /// ISO-DEP cards answer each of the first `apdu_count` commands with
    /// `90 00`.
    pub fn tag(self, apdu_count: usize) -> Option<RawTag<MockTechnology>> {
        let tag = match self {
            Self::IsoDepA => RawTag::builder(vec![0x04, 0xA2, 0xB3, 0xC4])
                .nfc_a(NfcAInfo {
                    atqa: vec![0x00, 0x04],
                    sak: 0x08,
                })
                .iso_dep(
                    IsoDepInfo {
                        historical_bytes: Some(vec![
                            0x80, 0x31, 0x80, 0x66, 0xB1, 0x84, 0x5E, 0x31, 0x80, 0x01, 0x80,
                            0x1A,
                        ]),
                        hi_layer_response: None,
                    },
                    scripted_iso_dep(apdu_count),
                )
                .build(),
            Self::IsoDepB => RawTag::builder(vec![0x5A, 0x3C, 0x10, 0x9E])
                .nfc_b(type_b_info(), MockTechnology::nfc_b())
                .iso_dep(
                    IsoDepInfo {
                        historical_bytes: None,
                        hi_layer_response: Some(vec![0x00]),
                    },
                    scripted_iso_dep(apdu_count),
                )
                .build(),
            Self::TypeB => {
                let card = MockTechnology::nfc_b();
                card.push_response(vec![
                    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x90, 0x00,
                ]);
                RawTag::builder(vec![0x11, 0x22, 0x33, 0x44])
                    .nfc_b(type_b_info(), card)
                    .build()
            }
            Self::Classic => RawTag::builder(vec![0xDE, 0xAD, 0xBE, 0xEF])
                .nfc_a(NfcAInfo {
                    atqa: vec![0x00, 0x04],
                    sak: 0x08,
                })
                .mifare_classic()
                .other("NdefFormatable")
                .build(),
            Self::Ultralight => RawTag::builder(vec![0x04, 0x52, 0x7C, 0xA2, 0x3F, 0x51, 0x80])
                .nfc_a(NfcAInfo {
                    atqa: vec![0x00, 0x44],
                    sak: 0x00,
                })
                .mifare_ultralight()
                .build(),
            Self::Felica => RawTag::builder(vec![0x01, 0x2E, 0x4C, 0xD8, 0x9A, 0x1B, 0x3F, 0x02])
                .nfc_f(NfcFInfo {
                    manufacturer: vec![0x03, 0x32, 0x42, 0x82, 0x82, 0x47, 0xAA, 0xFF],
                    system_code: vec![0x00, 0x03],
                })
                .build(),
            Self::Vicinity => RawTag::builder(vec![0xE0, 0x04, 0x01, 0x50, 0x12, 0x34, 0x56, 0x78])
                .nfc_v(NfcVInfo { dsf_id: 0x00 })
                .build(),
            Self::Empty => return None,
        };
        Some(tag)
    }
}

fn type_b_info() -> NfcBInfo {
    NfcBInfo {
        protocol_info: vec![0x00, 0x81, 0x81],
        application_data: vec![0x00, 0x00, 0x00, 0x00],
    }
}

fn scripted_iso_dep(apdu_count: usize) -> MockTechnology {
    let card = MockTechnology::iso_dep();
    for _ in 0..apdu_count {
        card.push_response(vec![0x90, 0x00]);
    }
    card
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfckit_hardware::TechKind;
    use rstest::rstest;

    #[rstest]
    #[case(Scenario::IsoDepA, vec![TechKind::NfcA, TechKind::IsoDep])]
    #[case(Scenario::IsoDepB, vec![TechKind::NfcB, TechKind::IsoDep])]
    #[case(Scenario::TypeB, vec![TechKind::NfcB])]
    #[case(Scenario::Classic, vec![TechKind::NfcA, TechKind::MifareClassic, TechKind::Other])]
    #[case(Scenario::Felica, vec![TechKind::NfcF])]
    fn test_scenario_technologies(#[case] scenario: Scenario, #[case] expected: Vec<TechKind>) {
        let tag = scenario.tag(0).unwrap();
        assert_eq!(tag.tech_list(), expected);
    }

    #[test]
    fn test_empty_scenario() {
        assert!(Scenario::Empty.tag(3).is_none());
    }
}
