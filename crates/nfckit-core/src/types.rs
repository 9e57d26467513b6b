use crate::codec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag kind deduced from the capabilities a tag advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagType {
    /// ISO 14443-4 smart card speaking ISO 7816 APDUs.
    Iso7816,
    /// MIFARE Classic memory card.
    MifareClassic,
    /// MIFARE Ultralight memory card.
    MifareUltralight,
    /// FeliCa (NFC-F).
    Felica,
    /// ISO 15693 vicinity card (NFC-V).
    Iso15693,
    /// Anything else.
    Unknown,
}

impl TagType {
    /// Wire name of the tag type, as delivered to callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iso7816 => "iso7816",
            Self::MifareClassic => "mifare_classic",
            Self::MifareUltralight => "mifare_ultralight",
            Self::Felica => "felica",
            Self::Iso15693 => "iso15693",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard-specific fields extracted during classification.
///
/// Every field is a lowercase hex string. Fields that do not apply to the
/// detected standard stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardMetadata {
    // ISO 14443 Type A
    pub atqa: String,
    pub sak: String,
    // ISO 14443 Type B
    pub protocol_info: String,
    pub application_data: String,
    // ISO 7816
    pub historical_bytes: String,
    pub hi_layer_response: String,
    // NFC-F / FeliCa
    pub manufacturer: String,
    pub system_code: String,
    // NFC-V
    pub dsf_id: String,
}

/// Identity of a discovered tag.
///
/// Produced once per successful poll and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagIdentity {
    pub tag_type: TagType,
    pub standard: &'static str,
    pub id: Vec<u8>,
    pub metadata: StandardMetadata,
}

impl TagIdentity {
    /// UID as lowercase hex.
    #[must_use]
    pub fn id_hex(&self) -> String {
        codec::encode(&self.id)
    }

    /// Flatten into the record shape delivered to calling applications.
    #[must_use]
    pub fn to_record(&self) -> TagRecord {
        let m = &self.metadata;
        TagRecord {
            tag_type: self.tag_type.as_str().to_string(),
            id: self.id_hex(),
            standard: self.standard.to_string(),
            atqa: m.atqa.clone(),
            sak: m.sak.clone(),
            historical_bytes: m.historical_bytes.clone(),
            protocol_info: m.protocol_info.clone(),
            application_data: m.application_data.clone(),
            hi_layer_response: m.hi_layer_response.clone(),
            manufacturer: m.manufacturer.clone(),
            system_code: m.system_code.clone(),
            dsf_id: m.dsf_id.clone(),
        }
    }
}

/// Flat, all-string record of a [`TagIdentity`].
///
/// Serializes to the JSON object applications receive from a poll:
///
/// ```
/// use nfckit_core::{StandardMetadata, TagIdentity, TagType};
///
/// let identity = TagIdentity {
///     tag_type: TagType::Iso15693,
///     standard: "ISO 15693",
///     id: vec![0xE0, 0x04, 0x01, 0x50],
///     metadata: StandardMetadata {
///         dsf_id: "00".to_string(),
///         ..Default::default()
///     },
/// };
///
/// let json = identity.to_record().to_json().unwrap();
/// assert!(json.contains(r#""type":"iso15693""#));
/// assert!(json.contains(r#""dsfId":"00""#));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRecord {
    #[serde(rename = "type")]
    pub tag_type: String,
    pub id: String,
    pub standard: String,
    pub atqa: String,
    pub sak: String,
    pub historical_bytes: String,
    pub protocol_info: String,
    pub application_data: String,
    pub hi_layer_response: String,
    pub manufacturer: String,
    pub system_code: String,
    pub dsf_id: String,
}

impl TagRecord {
    /// Serialize as a compact JSON object.
    ///
    /// # Errors
    /// Returns the underlying `serde_json` error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Radio availability as reported to applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// No NFC radio on this device.
    NotSupported,
    /// Radio present and enabled.
    Available,
    /// Radio present but switched off.
    Disabled,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotSupported => "not_supported",
            Self::Available => "available",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn iso_a_identity() -> TagIdentity {
        TagIdentity {
            tag_type: TagType::Iso7816,
            standard: "ISO 14443-4 (Type A)",
            id: vec![0x04, 0xA2, 0xB3, 0xC4],
            metadata: StandardMetadata {
                atqa: "0004".to_string(),
                sak: "08".to_string(),
                historical_bytes: "80318066b1845e318001801a".to_string(),
                ..Default::default()
            },
        }
    }

    #[rstest]
    #[case(TagType::Iso7816, "iso7816")]
    #[case(TagType::MifareClassic, "mifare_classic")]
    #[case(TagType::MifareUltralight, "mifare_ultralight")]
    #[case(TagType::Felica, "felica")]
    #[case(TagType::Iso15693, "iso15693")]
    #[case(TagType::Unknown, "unknown")]
    fn test_tag_type_names(#[case] tag_type: TagType, #[case] name: &str) {
        assert_eq!(tag_type.as_str(), name);
        assert_eq!(serde_json::to_string(&tag_type).unwrap(), format!("\"{name}\""));
    }

    #[test]
    fn test_record_flattens_identity() {
        let record = iso_a_identity().to_record();

        assert_eq!(record.tag_type, "iso7816");
        assert_eq!(record.id, "04a2b3c4");
        assert_eq!(record.standard, "ISO 14443-4 (Type A)");
        assert_eq!(record.atqa, "0004");
        assert_eq!(record.sak, "08");
        assert_eq!(record.historical_bytes, "80318066b1845e318001801a");
        assert!(record.protocol_info.is_empty());
        assert!(record.dsf_id.is_empty());
    }

    #[test]
    fn test_record_json_keys() {
        let json = iso_a_identity().to_record().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "type",
            "id",
            "standard",
            "atqa",
            "sak",
            "historicalBytes",
            "protocolInfo",
            "applicationData",
            "hiLayerResponse",
            "manufacturer",
            "systemCode",
            "dsfId",
        ] {
            assert!(object.get(key).is_some_and(|v| v.is_string()), "missing {key}");
        }
        assert_eq!(object.len(), 12);
    }

    #[test]
    fn test_availability_serialization() {
        assert_eq!(Availability::NotSupported.to_string(), "not_supported");
        let json = serde_json::to_string(&Availability::Disabled).unwrap();
        assert_eq!(json, "\"disabled\"");
    }
}
