//! # Chronicle Common Library
//!
//! Shared code for the Chronicle capture pipeline including:
//! - Event types (CaptureEvent enum) and the EventBus
//! - Configuration loading
//! - Common error types
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use config::CaptureConfig;
pub use error::{Error, Result};
pub use events::{CaptureEvent, EventBus};
