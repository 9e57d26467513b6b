//! Hardware Adapter abstraction for contactless tag readers.
//!
//! This crate defines the boundary between the polling stack and the NFC
//! radio driver. The driver is modelled as two traits:
//!
//! - [`NfcAdapter`]: radio existence and enabled state, plus reader-mode
//!   discovery that reports each tag through a callback.
//! - [`TagTechnology`]: a connectable command channel to one technology
//!   of a discovered tag (ISO-DEP or bare NFC-B).
//!
//! A discovered tag arrives as a [`RawTag`], a UID plus the list of
//! [`Capability`] values the tag advertises.
//!
//! # Design Philosophy
//!
//! - **Async I/O**: technology operations return `impl Future + Send`, so
//!   they can be awaited from spawned Tokio tasks.
//! - **Non-blocking discovery**: the driver invokes the callback from its
//!   own thread; callbacks must hand the tag off and return.
//! - **Error-aware**: all operations return [`Result<T>`][error::Result]
//!   with a [`HardwareError`] describing the driver failure.
//!
//! # Example
//!
//! ```
//! use nfckit_hardware::mock::{MockAdapter, MockTechnology};
//! use nfckit_hardware::types::{IsoDepInfo, NfcAInfo, RawTag, TechKind};
//!
//! let (_adapter, _handle) = MockAdapter::new();
//!
//! let tag = RawTag::builder(vec![0x04, 0xA2, 0xB3, 0xC4])
//!     .nfc_a(NfcAInfo { atqa: vec![0x00, 0x04], sak: 0x08 })
//!     .iso_dep(IsoDepInfo::default(), MockTechnology::iso_dep())
//!     .build();
//!
//! assert_eq!(tag.tech_list(), vec![TechKind::NfcA, TechKind::IsoDep]);
//! ```
//!
//! # Mock Implementations
//!
//! The `mock` feature (on by default) provides [`mock::MockAdapter`] and
//! [`mock::MockTechnology`] for development and testing without a radio.

pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use traits::{DiscoveryCallback, NfcAdapter, TagTechnology};
pub use types::{
    Capability, DiscoveryFlags, IsoDepInfo, NfcAInfo, NfcBInfo, NfcFInfo, NfcVInfo, RawTag,
    TechKind,
};
