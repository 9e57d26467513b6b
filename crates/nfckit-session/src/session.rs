//! Tag session: the single command channel to the current tag.
//!
//! A [`TagSession`] holds at most one [`TechBinding`]. It is owned by the
//! poll controller's task and never shared, so its methods take `&mut self`
//! and need no locking.
//!
//! # State Machine
//!
//! ```text
//! Idle ──bind──▶ Bound ──transceive──▶ Connected
//!                  ▲                       │
//!                  └──read_special_uid─────┘
//! Bound/Connected ──close──▶ Closed ──bind──▶ Bound
//! ```

use crate::apdu;
use crate::classifier::TechBinding;
use nfckit_core::constants::{SPECIAL_UID_COMMAND, SPECIAL_UID_LENGTH};
use nfckit_core::{Result, TagError, codec};
use nfckit_hardware::{TagTechnology, TechKind};
use serde::Serialize;
use tracing::{debug, trace, warn};

/// Lifecycle state of a [`TagSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No tag polled yet.
    Idle,
    /// A tag was polled; its technology (if any) is not connected.
    Bound,
    /// The bound technology is connected.
    Connected,
    /// The session was closed by finish, timeout or detach.
    Closed,
}

#[derive(Debug)]
pub struct TagSession<T> {
    binding: Option<TechBinding<T>>,
    state: SessionState,
}

impl<T: TagTechnology> TagSession<T> {
    pub fn new() -> Self {
        Self {
            binding: None,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Kind of the bound technology, if any.
    pub fn bound_kind(&self) -> Option<TechKind> {
        self.binding.as_ref().map(TechBinding::kind)
    }

    /// Take ownership of the binding produced by a new poll.
    ///
    /// A previous binding is closed first. `None` records a tag that offers
    /// no command channel.
    pub async fn bind(&mut self, binding: Option<TechBinding<T>>) {
        self.release().await;
        debug!(kind = ?binding.as_ref().map(TechBinding::kind), "Tag session bound");
        self.binding = binding;
        self.state = SessionState::Bound;
    }

    /// Send a command APDU over the bound ISO-DEP technology.
    ///
    /// Connects first if needed. The response is returned verbatim,
    /// status word included.
    ///
    /// # Errors
    ///
    /// - [`TagError::NoSession`] if no tag has been polled
    /// - [`TagError::Unsupported`] if the tag has no ISO-DEP channel
    /// - [`TagError::MalformedInput`] if `command` is not a valid APDU
    /// - [`TagError::Communication`] on connect or I/O failure
    pub async fn transceive(&mut self, command: &[u8]) -> Result<Vec<u8>> {
        let tech = match self.binding_for("transceive")? {
            TechBinding::IsoDep(tech) => tech,
            TechBinding::NfcB(_) => {
                return Err(TagError::unsupported("transceive on NfcB technology"));
            }
        };
        apdu::validate(command)?;

        let result = exchange_apdu(tech, command).await;
        self.state = if tech.is_connected() {
            SessionState::Connected
        } else {
            SessionState::Bound
        };
        result
    }

    /// Read the proprietary 8-byte UID of a bare Type B card.
    ///
    /// Sends `00 36 00 00 08` and keeps the first eight response bytes.
    /// The technology is closed afterwards whatever the outcome.
    ///
    /// # Errors
    ///
    /// - [`TagError::NoSession`] if no tag has been polled
    /// - [`TagError::Unsupported`] if the binding is not bare NFC-B
    /// - [`TagError::Communication`] on I/O failure or a short response
    pub async fn read_special_uid(&mut self) -> Result<Vec<u8>> {
        let tech = match self.binding_for("read special UID")? {
            TechBinding::NfcB(tech) => tech,
            TechBinding::IsoDep(_) => {
                return Err(TagError::unsupported("read special UID on IsoDep technology"));
            }
        };

        let result = exchange_apdu(tech, &SPECIAL_UID_COMMAND).await;
        if let Err(e) = tech.close().await {
            warn!("Failed to close NfcB technology: {}", e);
        }
        self.state = SessionState::Bound;

        let response = result?;
        if response.len() < SPECIAL_UID_LENGTH {
            return Err(TagError::communication(format!(
                "special UID response too short ({} bytes)",
                response.len()
            )));
        }
        Ok(response[..SPECIAL_UID_LENGTH].to_vec())
    }

    /// Release the binding. Close failures are logged, never returned.
    pub async fn close(&mut self) {
        self.release().await;
        if self.state != SessionState::Idle {
            self.state = SessionState::Closed;
        }
    }

    async fn release(&mut self) {
        if let Some(binding) = self.binding.take() {
            let kind = binding.kind();
            let mut tech = binding.into_technology();
            if let Err(e) = tech.close().await {
                warn!(%kind, "Failed to close technology: {}", e);
            }
        }
    }

    fn binding_for(&mut self, operation: &str) -> Result<&mut TechBinding<T>> {
        match self.state {
            SessionState::Idle | SessionState::Closed => return Err(TagError::NoSession),
            SessionState::Bound | SessionState::Connected => {}
        }
        self.binding
            .as_mut()
            .ok_or_else(|| TagError::unsupported(format!("{operation} on this type of card")))
    }
}

impl<T: TagTechnology> Default for TagSession<T> {
    fn default() -> Self {
        Self::new()
    }
}

async fn exchange_apdu<T: TagTechnology>(tech: &mut T, command: &[u8]) -> Result<Vec<u8>> {
    if !tech.is_connected() {
        tech.connect().await?;
    }
    trace!(kind = %tech.kind(), tx = %codec::encode(command), "APDU");
    let response = tech.transceive(command).await?;
    trace!(rx = %codec::encode(&response), "APDU");
    Ok(response)
}
