//! Mock tag technology with scripted responses.
//!
//! A [`MockTechnology`] is cheaply cloneable: every clone shares the same
//! state, so a test can keep one clone to script responses and inspect
//! traffic after the other clone was moved into a session.

use crate::{
    HardwareError, Result,
    traits::TagTechnology,
    types::TechKind,
};
use std::collections::VecDeque;
use std::future::{Future, ready};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Mock technology handle for testing and development.
///
/// # Examples
///
/// ```
/// use nfckit_hardware::mock::MockTechnology;
/// use nfckit_hardware::traits::TagTechnology;
///
/// #[tokio::main]
/// async fn main() -> nfckit_hardware::Result<()> {
///     let probe = MockTechnology::iso_dep();
///     probe.push_response(vec![0x90, 0x00]);
///
///     let mut tech = probe.clone();
///     tech.connect().await?;
///     let response = tech.transceive(&[0x00, 0xA4, 0x04, 0x00]).await?;
///
///     assert_eq!(response, vec![0x90, 0x00]);
///     assert_eq!(probe.sent_commands(), vec![vec![0x00, 0xA4, 0x04, 0x00]]);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockTechnology {
    kind: TechKind,
    state: Arc<Mutex<TechState>>,
}

#[derive(Debug, Default)]
struct TechState {
    connected: bool,
    out_of_field: bool,
    connect_failure: Option<String>,
    close_failure: Option<String>,
    responses: VecDeque<Result<Vec<u8>>>,
    sent: Vec<Vec<u8>>,
    connect_count: usize,
    close_count: usize,
}

impl MockTechnology {
    /// Create a disconnected technology of the given kind.
    pub fn new(kind: TechKind) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(TechState::default())),
        }
    }

    /// ISO-DEP (ISO 14443-4) technology.
    pub fn iso_dep() -> Self {
        Self::new(TechKind::IsoDep)
    }

    /// Bare NFC-B technology.
    pub fn nfc_b() -> Self {
        Self::new(TechKind::NfcB)
    }

    fn state(&self) -> MutexGuard<'_, TechState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a response for the next `transceive`.
    pub fn push_response(&self, response: Vec<u8>) {
        self.state().responses.push_back(Ok(response));
    }

    /// Queue a failure for the next `transceive`.
    pub fn push_error(&self, error: HardwareError) {
        self.state().responses.push_back(Err(error));
    }

    /// Make every subsequent `connect` fail with the message.
    pub fn fail_connect(&self, message: impl Into<String>) {
        self.state().connect_failure = Some(message.into());
    }

    /// Make every subsequent `close` fail with the message.
    pub fn fail_close(&self, message: impl Into<String>) {
        self.state().close_failure = Some(message.into());
    }

    /// Simulate the tag leaving the field. Further I/O fails.
    pub fn remove_from_field(&self) {
        let mut state = self.state();
        state.out_of_field = true;
        state.connected = false;
    }

    /// Commands received by `transceive`, oldest first.
    pub fn sent_commands(&self) -> Vec<Vec<u8>> {
        self.state().sent.clone()
    }

    /// Number of `connect` calls.
    pub fn connect_count(&self) -> usize {
        self.state().connect_count
    }

    /// Number of `close` calls.
    pub fn close_count(&self) -> usize {
        self.state().close_count
    }

    fn do_connect(&self) -> Result<()> {
        let mut state = self.state();
        state.connect_count += 1;

        if state.out_of_field {
            return Err(HardwareError::disconnected("Tag was lost"));
        }
        if let Some(message) = &state.connect_failure {
            return Err(HardwareError::communication(message.clone()));
        }

        state.connected = true;
        Ok(())
    }

    fn do_transceive(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut state = self.state();

        if state.out_of_field {
            return Err(HardwareError::disconnected("Tag was lost"));
        }
        if !state.connected {
            return Err(HardwareError::NotConnected);
        }

        state.sent.push(data.to_vec());
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(HardwareError::communication("No response from tag")))
    }

    fn do_close(&self) -> Result<()> {
        let mut state = self.state();
        state.close_count += 1;
        state.connected = false;

        match &state.close_failure {
            Some(message) => Err(HardwareError::communication(message.clone())),
            None => Ok(()),
        }
    }
}

impl TagTechnology for MockTechnology {
    fn kind(&self) -> TechKind {
        self.kind
    }

    fn is_connected(&self) -> bool {
        self.state().connected
    }

    fn connect(&mut self) -> impl Future<Output = Result<()>> + Send {
        ready(self.do_connect())
    }

    fn transceive(&mut self, data: &[u8]) -> impl Future<Output = Result<Vec<u8>>> + Send {
        ready(self.do_transceive(data))
    }

    fn close(&mut self) -> impl Future<Output = Result<()>> + Send {
        ready(self.do_close())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transceive_requires_connect() {
        let mut tech = MockTechnology::iso_dep();
        tech.push_response(vec![0x90, 0x00]);

        let result = tech.transceive(&[0x00, 0xB0, 0x00, 0x00]).await;
        assert!(matches!(result, Err(HardwareError::NotConnected)));

        tech.connect().await.unwrap();
        assert!(tech.is_connected());
        assert_eq!(
            tech.transceive(&[0x00, 0xB0, 0x00, 0x00]).await.unwrap(),
            vec![0x90, 0x00]
        );
    }

    #[tokio::test]
    async fn test_responses_are_consumed_in_order() {
        let mut tech = MockTechnology::nfc_b();
        tech.push_response(vec![0x01]);
        tech.push_error(HardwareError::timeout(618));
        tech.connect().await.unwrap();

        assert_eq!(tech.transceive(&[0x00]).await.unwrap(), vec![0x01]);
        assert!(matches!(
            tech.transceive(&[0x00]).await,
            Err(HardwareError::Timeout { duration_ms: 618 })
        ));
        assert!(tech.transceive(&[0x00]).await.is_err());
        assert_eq!(tech.sent_commands().len(), 3);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let probe = MockTechnology::iso_dep();
        let mut tech = probe.clone();

        tech.connect().await.unwrap();
        tech.close().await.unwrap();

        assert_eq!(probe.connect_count(), 1);
        assert_eq!(probe.close_count(), 1);
        assert!(!probe.is_connected());
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let mut tech = MockTechnology::iso_dep();
        tech.fail_connect("Activation failed");

        let err = tech.connect().await.unwrap_err();
        assert_eq!(err.to_string(), "Communication error: Activation failed");
        assert!(!tech.is_connected());
    }

    #[tokio::test]
    async fn test_close_failure_still_disconnects() {
        let mut tech = MockTechnology::iso_dep();
        tech.fail_close("Close failed");
        tech.connect().await.unwrap();

        assert!(tech.close().await.is_err());
        assert!(!tech.is_connected());
    }

    #[tokio::test]
    async fn test_removed_from_field() {
        let mut tech = MockTechnology::iso_dep();
        tech.connect().await.unwrap();
        tech.remove_from_field();

        assert!(matches!(
            tech.transceive(&[0x00]).await,
            Err(HardwareError::Disconnected { .. })
        ));
        assert!(tech.connect().await.is_err());
    }
}
