//! Polling sessions for contactless tags.
//!
//! A [`PollController`] arms a time-bounded discovery window on an
//! [`NfcAdapter`](nfckit_hardware::NfcAdapter), classifies the first tag
//! that appears and keeps its command channel open in a [`TagSession`]
//! until the caller finishes, the window times out, or the controller is
//! detached. At most one tag session exists per controller.
//!
//! # Modules
//!
//! - [`classifier`]: capability set to [`TagIdentity`](nfckit_core::TagIdentity)
//! - [`session`]: the bound technology and its state machine
//! - [`controller`]: the actor serializing polls, timers and transceives
//! - [`apdu`]: ISO 7816-4 command framing checks
//! - [`config`]: [`PollConfig`]

pub mod apdu;
pub mod classifier;
pub mod config;
pub mod controller;
pub mod session;

pub use classifier::{Classification, TechBinding, classify, identify};
pub use config::PollConfig;
pub use controller::{PollController, SessionStatus};
pub use session::{SessionState, TagSession};
