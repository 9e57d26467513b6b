//! Mock NFC adapter implementation for testing and development.
//!
//! This module provides a simulated radio adapter that can be controlled
//! programmatically for testing without requiring physical hardware.

use crate::{
    Result,
    mock::MockTechnology,
    traits::{DiscoveryCallback, NfcAdapter},
    types::{DiscoveryFlags, RawTag},
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Mock NFC adapter for testing and development.
///
/// Tags are brought into the field through the paired [`MockAdapterHandle`].
/// While discovery is enabled the handle invokes the registered callback,
/// exactly as a driver would from its own thread.
///
/// # Examples
///
/// ```
/// use nfckit_hardware::mock::{MockAdapter, MockTechnology};
/// use nfckit_hardware::traits::NfcAdapter;
/// use nfckit_hardware::types::{DiscoveryFlags, NfcVInfo, RawTag};
/// use std::sync::{Arc, Mutex};
///
/// let (adapter, handle) = MockAdapter::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = Arc::clone(&seen);
/// let on_tag = move |tag: RawTag<MockTechnology>| sink.lock().unwrap().push(tag.id);
/// adapter.enable_discovery(DiscoveryFlags::all(), Arc::new(on_tag)).unwrap();
///
/// let tag = RawTag::builder(vec![0xE0, 0x04, 0x01, 0x50])
///     .nfc_v(NfcVInfo { dsf_id: 0x00 })
///     .build();
/// assert!(handle.present_tag(tag));
/// assert_eq!(seen.lock().unwrap().len(), 1);
/// ```
#[derive(Debug)]
pub struct MockAdapter {
    shared: Arc<Mutex<AdapterState>>,
}

struct AdapterState {
    present: bool,
    enabled: bool,
    discovery: Option<(DiscoveryFlags, DiscoveryCallback<MockTechnology>)>,
    last_callback: Option<DiscoveryCallback<MockTechnology>>,
    enable_count: usize,
    disable_count: usize,
}

impl std::fmt::Debug for AdapterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterState")
            .field("present", &self.present)
            .field("enabled", &self.enabled)
            .field("discovery", &self.discovery.as_ref().map(|(flags, _)| flags))
            .field("enable_count", &self.enable_count)
            .field("disable_count", &self.disable_count)
            .finish()
    }
}

fn lock(shared: &Mutex<AdapterState>) -> MutexGuard<'_, AdapterState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockAdapter {
    /// Create a present, enabled mock adapter.
    ///
    /// Returns a tuple of (MockAdapter, MockAdapterHandle) where the handle
    /// can be used to simulate tags and radio state changes.
    pub fn new() -> (Self, MockAdapterHandle) {
        Self::with_state(true, true)
    }

    /// Create a mock adapter for a device without an NFC radio.
    pub fn not_supported() -> (Self, MockAdapterHandle) {
        Self::with_state(false, false)
    }

    /// Create a mock adapter whose radio is switched off.
    pub fn disabled() -> (Self, MockAdapterHandle) {
        Self::with_state(true, false)
    }

    fn with_state(present: bool, enabled: bool) -> (Self, MockAdapterHandle) {
        let shared = Arc::new(Mutex::new(AdapterState {
            present,
            enabled,
            discovery: None,
            last_callback: None,
            enable_count: 0,
            disable_count: 0,
        }));

        let handle = MockAdapterHandle {
            shared: Arc::clone(&shared),
        };

        (Self { shared }, handle)
    }
}

impl NfcAdapter for MockAdapter {
    type Technology = MockTechnology;

    fn is_present(&self) -> bool {
        lock(&self.shared).present
    }

    fn is_enabled(&self) -> bool {
        let state = lock(&self.shared);
        state.present && state.enabled
    }

    fn enable_discovery(
        &self,
        flags: DiscoveryFlags,
        on_tag: DiscoveryCallback<MockTechnology>,
    ) -> Result<()> {
        let mut state = lock(&self.shared);
        if !(state.present && state.enabled) {
            return Err(crate::HardwareError::disconnected("NFC adapter disabled"));
        }

        debug!(?flags, "Mock adapter entering reader mode");
        state.last_callback = Some(Arc::clone(&on_tag));
        state.discovery = Some((flags, on_tag));
        state.enable_count += 1;
        Ok(())
    }

    fn disable_discovery(&self) -> Result<()> {
        let mut state = lock(&self.shared);
        if state.discovery.take().is_some() {
            debug!("Mock adapter leaving reader mode");
        }
        state.disable_count += 1;
        Ok(())
    }
}

/// Handle for controlling a mock NFC adapter.
#[derive(Debug, Clone)]
pub struct MockAdapterHandle {
    shared: Arc<Mutex<AdapterState>>,
}

impl MockAdapterHandle {
    /// Bring a tag into the field.
    ///
    /// Invokes the discovery callback when discovery is enabled and the
    /// tag exposes at least one radio technology the flags allow. The
    /// callback runs outside the adapter lock.
    ///
    /// Returns `true` if the callback was invoked.
    pub fn present_tag(&self, tag: RawTag<MockTechnology>) -> bool {
        let callback = {
            let state = lock(&self.shared);
            match &state.discovery {
                Some((flags, callback)) if Self::is_visible(flags, &tag) => Arc::clone(callback),
                _ => {
                    debug!(id = ?tag.id, "Tag ignored, discovery not listening for it");
                    return false;
                }
            }
        };

        callback(tag);
        true
    }

    /// Deliver a tag through the most recently registered callback even if
    /// discovery has been disabled since.
    ///
    /// Emulates a driver thread that read the tag just before reader mode
    /// was switched off. Returns `true` if a callback was ever registered.
    pub fn deliver_in_flight(&self, tag: RawTag<MockTechnology>) -> bool {
        let callback = lock(&self.shared).last_callback.clone();
        match callback {
            Some(callback) => {
                callback(tag);
                true
            }
            None => false,
        }
    }

    fn is_visible(flags: &DiscoveryFlags, tag: &RawTag<MockTechnology>) -> bool {
        let radios: Vec<_> = tag.tech_list().into_iter().filter(|k| k.is_radio()).collect();
        radios.is_empty() || radios.into_iter().any(|kind| flags.allows(kind))
    }

    /// Switch the radio on or off. Switching off drops reader mode.
    pub fn set_enabled(&self, enabled: bool) {
        let mut state = lock(&self.shared);
        state.enabled = enabled;
        if !enabled {
            state.discovery = None;
        }
    }

    /// Check if reader mode is active.
    pub fn is_discovery_enabled(&self) -> bool {
        lock(&self.shared).discovery.is_some()
    }

    /// Flags passed to the most recent `enable_discovery`, if still active.
    pub fn discovery_flags(&self) -> Option<DiscoveryFlags> {
        lock(&self.shared).discovery.as_ref().map(|(flags, _)| *flags)
    }

    /// Number of successful `enable_discovery` calls.
    pub fn enable_count(&self) -> usize {
        lock(&self.shared).enable_count
    }

    /// Number of `disable_discovery` calls.
    pub fn disable_count(&self) -> usize {
        lock(&self.shared).disable_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NfcAInfo, NfcFInfo, TechKind};

    fn counting_callback() -> (DiscoveryCallback<MockTechnology>, Arc<Mutex<Vec<Vec<u8>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: DiscoveryCallback<MockTechnology> =
            Arc::new(move |tag: RawTag<MockTechnology>| sink.lock().unwrap().push(tag.id));
        (callback, seen)
    }

    fn felica_tag() -> RawTag<MockTechnology> {
        RawTag::builder(vec![0x01, 0x2E, 0x4C, 0xD8, 0x9A, 0x1B, 0x3F, 0x02])
            .nfc_f(NfcFInfo {
                manufacturer: vec![0x03, 0x32, 0x42, 0x82, 0x82, 0x47, 0xAA, 0xFF],
                system_code: vec![0x00, 0x03],
            })
            .build()
    }

    #[test]
    fn test_availability_states() {
        let (adapter, _) = MockAdapter::new();
        assert!(adapter.is_present() && adapter.is_enabled());

        let (adapter, _) = MockAdapter::disabled();
        assert!(adapter.is_present() && !adapter.is_enabled());

        let (adapter, _) = MockAdapter::not_supported();
        assert!(!adapter.is_present() && !adapter.is_enabled());
    }

    #[test]
    fn test_present_tag_without_discovery() {
        let (_adapter, handle) = MockAdapter::new();
        assert!(!handle.present_tag(felica_tag()));
    }

    #[test]
    fn test_present_tag_invokes_callback() {
        let (adapter, handle) = MockAdapter::new();
        let (callback, seen) = counting_callback();

        adapter.enable_discovery(DiscoveryFlags::all(), callback).unwrap();
        assert!(handle.present_tag(felica_tag()));
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(handle.enable_count(), 1);
    }

    #[test]
    fn test_flags_filter_radio_technologies() {
        let (adapter, handle) = MockAdapter::new();
        let (callback, seen) = counting_callback();
        let flags = DiscoveryFlags {
            nfc_f: false,
            ..DiscoveryFlags::all()
        };

        adapter.enable_discovery(flags, callback).unwrap();
        assert!(!handle.present_tag(felica_tag()));

        let tag_a = RawTag::builder(vec![0x04, 0x11, 0x22, 0x33])
            .nfc_a(NfcAInfo {
                atqa: vec![0x44, 0x00],
                sak: 0x00,
            })
            .build();
        assert!(handle.present_tag(tag_a));
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(handle.discovery_flags(), Some(flags));
    }

    #[test]
    fn test_disable_discovery() {
        let (adapter, handle) = MockAdapter::new();
        let (callback, seen) = counting_callback();

        adapter.enable_discovery(DiscoveryFlags::all(), callback).unwrap();
        adapter.disable_discovery().unwrap();
        adapter.disable_discovery().unwrap();

        assert!(!handle.is_discovery_enabled());
        assert!(!handle.present_tag(felica_tag()));
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(handle.disable_count(), 2);
    }

    #[test]
    fn test_enable_discovery_fails_when_disabled() {
        let (adapter, handle) = MockAdapter::disabled();
        let (callback, _) = counting_callback();

        assert!(adapter.enable_discovery(DiscoveryFlags::all(), callback).is_err());
        assert!(!handle.is_discovery_enabled());
    }

    #[test]
    fn test_switching_radio_off_drops_reader_mode() {
        let (adapter, handle) = MockAdapter::new();
        let (callback, _) = counting_callback();

        adapter.enable_discovery(DiscoveryFlags::all(), callback).unwrap();
        handle.set_enabled(false);

        assert!(!adapter.is_enabled());
        assert!(!handle.is_discovery_enabled());
    }

    #[test]
    fn test_deliver_in_flight_after_disable() {
        let (adapter, handle) = MockAdapter::new();
        assert!(!handle.deliver_in_flight(felica_tag()));

        let (callback, seen) = counting_callback();
        adapter.enable_discovery(DiscoveryFlags::all(), callback).unwrap();
        adapter.disable_discovery().unwrap();

        assert!(handle.deliver_in_flight(felica_tag()));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_tag_without_radio_technology_is_reported() {
        let (adapter, handle) = MockAdapter::new();
        let (callback, seen) = counting_callback();
        adapter.enable_discovery(DiscoveryFlags::all(), callback).unwrap();

        let tag = RawTag::builder(vec![0x01, 0x02, 0x03, 0x04])
            .other("NfcBarcode")
            .build();
        assert_eq!(tag.tech_list(), vec![TechKind::Other]);
        assert!(handle.present_tag(tag));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
