//! Poll controller configuration.

use nfckit_core::constants::DEFAULT_POLL_TIMEOUT_MS;
use nfckit_hardware::DiscoveryFlags;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`PollController`](crate::PollController).
///
/// # Example
///
/// ```
/// use nfckit_session::PollConfig;
/// use std::time::Duration;
///
/// let config = PollConfig::default().with_default_timeout(Duration::from_secs(5));
/// assert_eq!(config.default_timeout(), Duration::from_secs(5));
///
/// let config: PollConfig = serde_json::from_str(r#"{"default_timeout_ms": 1500}"#).unwrap();
/// assert_eq!(config.default_timeout(), Duration::from_millis(1500));
/// assert!(config.discovery.skip_ndef_check);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Discovery window used when `poll` is called without a timeout.
    pub default_timeout_ms: u64,

    /// Reader-mode flags passed to the adapter.
    pub discovery: DiscoveryFlags,

    /// Capacity of the controller's command queue.
    pub command_buffer: usize,
}

impl PollConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_command_buffer(mut self, command_buffer: usize) -> Self {
        self.command_buffer = command_buffer.max(1);
        self
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            discovery: DiscoveryFlags::all(),
            command_buffer: 32,
        }
    }
}
