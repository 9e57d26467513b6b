//! Mock implementations for testing and development.
//!
//! This module provides a simulated radio adapter and tag technologies
//! that can be controlled programmatically without requiring hardware.

pub mod adapter;
pub mod technology;

// Re-export commonly used types
pub use adapter::{MockAdapter, MockAdapterHandle};
pub use technology::MockTechnology;
