//! check_mailcow_rspamd common - shared types and configuration
//!
//! This crate provides the check states, rspamd action categories,
//! configuration and error types shared by the core and the plugin binary.

pub mod config;
pub mod error;
pub mod types;

pub use config::{CheckConfig, LoggingConfig};
pub use error::{Error, Result};
pub use types::{Action, CheckState, Thresholds};
