//! check_mailcow_rspamd core - history client and check evaluation
//!
//! This crate fetches the rspamd action history from a Mailcow instance,
//! maps it to typed entries and evaluates it into a monitoring plugin result.

pub mod check;
pub mod history;

pub use check::{CheckEvaluator, CheckReport, Metric, Tally, TrafficStats};
pub use history::{parse_history, LogEntry, MailcowClient, MailcowClientConfig};
