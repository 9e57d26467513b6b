//! Hardware Adapter trait definitions.
//!
//! These traits are the contract between the polling stack and the radio
//! driver. An [`NfcAdapter`] reports whether the radio exists and is on,
//! and switches reader-mode discovery on and off. Each discovered tag is
//! handed to the registered [`DiscoveryCallback`] as a [`RawTag`] whose
//! connectable capabilities carry a [`TagTechnology`] handle.
//!
//! Technology methods return `impl Future + Send` so the session can drive
//! them from a spawned Tokio task. Implementors may still write plain
//! `async fn` in their impl blocks.

use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{DiscoveryFlags, RawTag, TechKind};

/// Callback invoked by the driver for every tag that enters the field
/// while discovery is enabled.
///
/// The driver calls it from its own thread. Implementations must return
/// quickly and must not block.
pub type DiscoveryCallback<T> = Arc<dyn Fn(RawTag<T>) + Send + Sync>;

/// NFC radio adapter.
///
/// # Examples
///
/// ```
/// use nfckit_hardware::mock::{MockAdapter, MockTechnology};
/// use nfckit_hardware::traits::NfcAdapter;
/// use nfckit_hardware::types::{DiscoveryFlags, RawTag};
/// use std::sync::Arc;
///
/// let (adapter, handle) = MockAdapter::new();
/// assert!(adapter.is_enabled());
///
/// let on_tag = |tag: RawTag<MockTechnology>| println!("{:02X?}", tag.id);
/// adapter
///     .enable_discovery(DiscoveryFlags::all(), Arc::new(on_tag))
///     .unwrap();
/// assert!(handle.is_discovery_enabled());
///
/// adapter.disable_discovery().unwrap();
/// assert!(!handle.is_discovery_enabled());
/// ```
pub trait NfcAdapter: Send + Sync + 'static {
    /// Technology handle type carried by discovered tags.
    type Technology: TagTechnology;

    /// Check if the device has an NFC radio at all.
    fn is_present(&self) -> bool;

    /// Check if the radio is present and switched on.
    fn is_enabled(&self) -> bool;

    /// Enter reader mode, reporting tags through `on_tag`.
    ///
    /// Replaces any callback registered by a previous call.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver refuses to enter reader mode.
    fn enable_discovery(
        &self,
        flags: DiscoveryFlags,
        on_tag: DiscoveryCallback<Self::Technology>,
    ) -> Result<()>;

    /// Leave reader mode. Calling it while discovery is off is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to leave reader mode.
    fn disable_discovery(&self) -> Result<()>;
}

/// Live command channel to one technology of a discovered tag.
///
/// A technology starts disconnected. `transceive` requires a prior
/// `connect`; `close` releases the channel and may be followed by another
/// `connect` while the tag stays in the field.
pub trait TagTechnology: Send + 'static {
    /// Which technology this handle drives.
    fn kind(&self) -> TechKind;

    /// Check if `connect` succeeded and `close` has not been called since.
    fn is_connected(&self) -> bool;

    /// Open the channel to the tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag left the field or refused activation.
    fn connect(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Send a raw frame and wait for the tag's response frame.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure, if not connected, or if the driver
    /// rejects the frame.
    fn transceive(&mut self, data: &[u8]) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Close the channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to release the channel.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;
}
