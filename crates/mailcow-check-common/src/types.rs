//! Common types for check_mailcow_rspamd

use std::fmt;

/// Monitoring plugin check state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckState {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl CheckState {
    /// Process exit code understood by Icinga/Nagios
    pub fn exit_code(self) -> i32 {
        match self {
            CheckState::Ok => 0,
            CheckState::Warning => 1,
            CheckState::Critical => 2,
            CheckState::Unknown => 3,
        }
    }

    /// Label printed at the start of the status line
    pub fn as_str(self) -> &'static str {
        match self {
            CheckState::Ok => "OK",
            CheckState::Warning => "WARNING",
            CheckState::Critical => "CRITICAL",
            CheckState::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action taken by rspamd on a message
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Reject,
    SoftReject,
    RewriteSubject,
    AddHeader,
    Greylist,
    NoAction,
    /// Any action name rspamd reports that is not one of the above
    Other(String),
}

impl Action {
    /// Known actions in perfdata order
    pub const KNOWN: [Action; 6] = [
        Action::Reject,
        Action::SoftReject,
        Action::RewriteSubject,
        Action::AddHeader,
        Action::Greylist,
        Action::NoAction,
    ];

    /// Map an rspamd action name
    pub fn parse(s: &str) -> Self {
        match s {
            "reject" => Action::Reject,
            "soft reject" => Action::SoftReject,
            "rewrite subject" => Action::RewriteSubject,
            "add header" => Action::AddHeader,
            "greylist" => Action::Greylist,
            "no action" => Action::NoAction,
            other => Action::Other(other.to_string()),
        }
    }

    /// Name as rspamd reports it
    pub fn as_str(&self) -> &str {
        match self {
            Action::Reject => "reject",
            Action::SoftReject => "soft reject",
            Action::RewriteSubject => "rewrite subject",
            Action::AddHeader => "add header",
            Action::Greylist => "greylist",
            Action::NoAction => "no action",
            Action::Other(name) => name,
        }
    }

    /// Empty action name, which carries no category
    pub fn is_blank(&self) -> bool {
        matches!(self, Action::Other(name) if name.is_empty())
    }

    /// Position in [`Action::KNOWN`], `None` for unrecognized actions
    pub fn index(&self) -> Option<usize> {
        match self {
            Action::Reject => Some(0),
            Action::SoftReject => Some(1),
            Action::RewriteSubject => Some(2),
            Action::AddHeader => Some(3),
            Action::Greylist => Some(4),
            Action::NoAction => Some(5),
            Action::Other(_) => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seconds-since-last-mail thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub warning_secs: i64,
    pub critical_secs: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning_secs: crate::config::DEFAULT_WARNING_SECS,
            critical_secs: crate::config::DEFAULT_CRITICAL_SECS,
        }
    }
}

impl Thresholds {
    pub fn new(warning_secs: i64, critical_secs: i64) -> Self {
        Self {
            warning_secs,
            critical_secs,
        }
    }

    /// Classify an elapsed time, critical first
    pub fn classify(&self, elapsed_secs: i64) -> CheckState {
        if elapsed_secs >= self.critical_secs {
            CheckState::Critical
        } else if elapsed_secs >= self.warning_secs {
            CheckState::Warning
        } else {
            CheckState::Ok
        }
    }
}
