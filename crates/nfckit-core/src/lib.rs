//! Core types for contactless tag polling.
//!
//! This crate holds the pieces shared by every other `nfckit` crate: the
//! hex [`codec`] used at each boundary crossing, the [`TagIdentity`] value
//! produced by a successful poll, and the [`TagError`] taxonomy with its
//! stable caller-facing error codes.

pub mod codec;
pub mod constants;
pub mod error;
pub mod types;

pub use error::{Result, TagError};
pub use types::*;
