//! Rspamd action history
//!
//! Mailcow exposes the rspamd history as a loosely-typed JSON array. Entries
//! are mapped to [`LogEntry`] here so the check logic only ever sees typed
//! data:
//! - `unix_time` (or `timestamp`) as integer, float or numeric string
//! - `action` as string
//! - `user` and `rcpt_smtp` when present, for traffic statistics

pub mod client;

pub use client::{MailcowClient, MailcowClientConfig};

use mailcow_check_common::{Action, Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// Sender value Mailcow uses for unauthenticated (inbound) mail
pub const UNKNOWN_USER: &str = "unknown";

/// One rspamd action record
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Seconds since epoch
    pub timestamp: i64,
    pub action: Action,
    /// Authenticated sender, `"unknown"` for inbound mail
    pub user: Option<String>,
    /// Envelope recipients
    pub recipients: Vec<String>,
}

impl LogEntry {
    pub fn new(timestamp: i64, action: Action) -> Self {
        Self {
            timestamp,
            action,
            user: None,
            recipients: Vec::new(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_recipient(mut self, rcpt: impl Into<String>) -> Self {
        self.recipients.push(rcpt.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default, alias = "timestamp")]
    unix_time: Option<Value>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    rcpt_smtp: Option<Vec<String>>,
}

/// Map a decoded history body to typed entries
pub fn parse_history(body: Value) -> Result<Vec<LogEntry>> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(ref map) if map.get("type").and_then(Value::as_str) == Some("error") => {
            let msg = match map.get("msg") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "unspecified error".to_string(),
            };
            return Err(Error::Api(msg));
        }
        other => {
            return Err(Error::MalformedHistory(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| parse_entry(index, item))
        .collect()
}

fn parse_entry(index: usize, item: Value) -> Result<LogEntry> {
    let raw: RawEntry = serde_json::from_value(item)
        .map_err(|e| Error::MalformedHistory(format!("entry {}: {}", index, e)))?;

    let timestamp = match raw.unix_time {
        Some(value) => parse_timestamp(&value).ok_or_else(|| {
            Error::MalformedHistory(format!("entry {}: invalid unix_time {}", index, value))
        })?,
        None => {
            return Err(Error::MalformedHistory(format!(
                "entry {}: missing unix_time",
                index
            )))
        }
    };

    let action = raw
        .action
        .ok_or_else(|| Error::MalformedHistory(format!("entry {}: missing action", index)))?;

    Ok(LogEntry {
        timestamp,
        action: Action::parse(&action),
        user: raw.user,
        recipients: raw.rcpt_smtp.unwrap_or_default(),
    })
}

fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
