//! # SVG Bulk Common Library
//!
//! Shared code for the SVG bulk cropper workspace:
//! - Error type used by configuration loading
//! - TOML configuration file discovery and directory validation
//! - Session event types and the EventBus
//! - Server-Sent Events helpers

pub mod config;
pub mod error;
pub mod events;
pub mod sse;

pub use error::{Error, Result};
