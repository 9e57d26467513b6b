//! Data reported by the radio driver when a tag enters the field.
//!
//! A discovered tag is a [`RawTag`]: its UID plus the set of technology
//! [`Capability`] values it advertises. Capabilities that can carry a
//! command channel (ISO-DEP and bare NFC-B) hold a live technology handle;
//! the others only carry the fields the driver read during anticollision.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Technology identifier, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TechKind {
    NfcA,
    NfcB,
    NfcF,
    NfcV,
    IsoDep,
    MifareClassic,
    MifareUltralight,
    Other,
}

impl TechKind {
    /// Check if this is one of the four radio technologies a reader polls for.
    pub fn is_radio(&self) -> bool {
        matches!(self, Self::NfcA | Self::NfcB | Self::NfcF | Self::NfcV)
    }
}

impl fmt::Display for TechKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NfcA => write!(f, "NfcA"),
            Self::NfcB => write!(f, "NfcB"),
            Self::NfcF => write!(f, "NfcF"),
            Self::NfcV => write!(f, "NfcV"),
            Self::IsoDep => write!(f, "IsoDep"),
            Self::MifareClassic => write!(f, "MifareClassic"),
            Self::MifareUltralight => write!(f, "MifareUltralight"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// ISO 14443-3 Type A anticollision data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfcAInfo {
    /// ATQA, two bytes as sent by the tag.
    pub atqa: Vec<u8>,
    /// SAK byte.
    pub sak: u8,
}

/// ISO 14443-3 Type B ATQB data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfcBInfo {
    pub protocol_info: Vec<u8>,
    pub application_data: Vec<u8>,
}

/// ISO 14443-4 activation data.
///
/// Type A tags report historical bytes from the ATS; Type B tags report
/// the higher layer response from ATTRIB. The other field is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsoDepInfo {
    pub historical_bytes: Option<Vec<u8>>,
    pub hi_layer_response: Option<Vec<u8>>,
}

/// NFC-F (FeliCa) polling response data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfcFInfo {
    /// PMm, 8 bytes.
    pub manufacturer: Vec<u8>,
    /// System code, 2 bytes.
    pub system_code: Vec<u8>,
}

/// NFC-V (ISO 15693) inventory data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfcVInfo {
    pub dsf_id: u8,
}

/// One technology advertised by a discovered tag.
#[derive(Debug)]
pub enum Capability<T> {
    NfcA(NfcAInfo),
    NfcB(NfcBInfo, T),
    NfcF(NfcFInfo),
    NfcV(NfcVInfo),
    IsoDep(IsoDepInfo, T),
    MifareClassic,
    MifareUltralight,
    /// Technology the stack does not classify (NDEF, barcode, ...).
    Other(String),
}

impl<T> Capability<T> {
    pub fn kind(&self) -> TechKind {
        match self {
            Self::NfcA(_) => TechKind::NfcA,
            Self::NfcB(..) => TechKind::NfcB,
            Self::NfcF(_) => TechKind::NfcF,
            Self::NfcV(_) => TechKind::NfcV,
            Self::IsoDep(..) => TechKind::IsoDep,
            Self::MifareClassic => TechKind::MifareClassic,
            Self::MifareUltralight => TechKind::MifareUltralight,
            Self::Other(_) => TechKind::Other,
        }
    }
}

/// A tag as reported by the driver's discovery callback.
#[derive(Debug)]
pub struct RawTag<T> {
    /// Hardware UID.
    pub id: Vec<u8>,

    /// Advertised technologies, in driver order.
    pub capabilities: Vec<Capability<T>>,

    /// When the driver saw the tag.
    pub discovered_at: chrono::DateTime<chrono::Utc>,
}

impl<T> RawTag<T> {
    /// Create a builder for a tag with the given UID.
    ///
    /// # Examples
    ///
    /// ```
    /// use nfckit_hardware::types::{NfcAInfo, RawTag, TechKind};
    ///
    /// let tag: RawTag<()> = RawTag::builder(vec![0x04, 0xA2, 0xB3, 0xC4])
    ///     .nfc_a(NfcAInfo { atqa: vec![0x00, 0x44], sak: 0x00 })
    ///     .mifare_ultralight()
    ///     .build();
    ///
    /// assert!(tag.has(TechKind::MifareUltralight));
    /// assert!(!tag.has(TechKind::IsoDep));
    /// ```
    pub fn builder(id: Vec<u8>) -> RawTagBuilder<T> {
        RawTagBuilder::new(id)
    }

    /// Technology identifiers, in driver order.
    pub fn tech_list(&self) -> Vec<TechKind> {
        self.capabilities.iter().map(Capability::kind).collect()
    }

    /// Check whether the tag advertises a technology.
    pub fn has(&self, kind: TechKind) -> bool {
        self.capabilities.iter().any(|c| c.kind() == kind)
    }
}

#[derive(Debug)]
pub struct RawTagBuilder<T> {
    id: Vec<u8>,
    capabilities: Vec<Capability<T>>,
    discovered_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl<T> RawTagBuilder<T> {
    pub fn new(id: Vec<u8>) -> Self {
        Self {
            id,
            capabilities: Vec::new(),
            discovered_at: None,
        }
    }

    pub fn capability(mut self, capability: Capability<T>) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn nfc_a(self, info: NfcAInfo) -> Self {
        self.capability(Capability::NfcA(info))
    }

    pub fn nfc_b(self, info: NfcBInfo, technology: T) -> Self {
        self.capability(Capability::NfcB(info, technology))
    }

    pub fn nfc_f(self, info: NfcFInfo) -> Self {
        self.capability(Capability::NfcF(info))
    }

    pub fn nfc_v(self, info: NfcVInfo) -> Self {
        self.capability(Capability::NfcV(info))
    }

    pub fn iso_dep(self, info: IsoDepInfo, technology: T) -> Self {
        self.capability(Capability::IsoDep(info, technology))
    }

    pub fn mifare_classic(self) -> Self {
        self.capability(Capability::MifareClassic)
    }

    pub fn mifare_ultralight(self) -> Self {
        self.capability(Capability::MifareUltralight)
    }

    pub fn other(self, name: impl Into<String>) -> Self {
        self.capability(Capability::Other(name.into()))
    }

    pub fn timestamp(mut self, discovered_at: chrono::DateTime<chrono::Utc>) -> Self {
        self.discovered_at = Some(discovered_at);
        self
    }

    pub fn build(self) -> RawTag<T> {
        RawTag {
            id: self.id,
            capabilities: self.capabilities,
            discovered_at: self.discovered_at.unwrap_or_else(chrono::Utc::now),
        }
    }
}

/// Reader-mode flags passed to [`NfcAdapter::enable_discovery`].
///
/// [`NfcAdapter::enable_discovery`]: crate::traits::NfcAdapter::enable_discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryFlags {
    pub nfc_a: bool,
    pub nfc_b: bool,
    pub nfc_f: bool,
    pub nfc_v: bool,

    /// Skip the NDEF presence check the driver would otherwise run before
    /// reporting the tag.
    pub skip_ndef_check: bool,
}

impl DiscoveryFlags {
    /// Poll every supported radio technology and skip the NDEF check.
    pub const fn all() -> Self {
        Self {
            nfc_a: true,
            nfc_b: true,
            nfc_f: true,
            nfc_v: true,
            skip_ndef_check: true,
        }
    }

    /// Check if the radio technology is polled. Non-radio kinds are
    /// always allowed; they ride on top of a radio technology.
    pub fn allows(&self, kind: TechKind) -> bool {
        match kind {
            TechKind::NfcA => self.nfc_a,
            TechKind::NfcB => self.nfc_b,
            TechKind::NfcF => self.nfc_f,
            TechKind::NfcV => self.nfc_v,
            _ => true,
        }
    }
}

impl Default for DiscoveryFlags {
    fn default() -> Self {
        Self::all()
    }
}
