//! Error types for check_mailcow_rspamd

use thiserror::Error;

/// Main error type for the check
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Mailcow API error: {0}")]
    Api(String),

    #[error("Malformed rspamd history: {0}")]
    MalformedHistory(String),
}

/// Result type alias for the check
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Http(_) => "HTTP_ERROR",
            Error::Api(_) => "API_ERROR",
            Error::MalformedHistory(_) => "MALFORMED_HISTORY",
        }
    }

    /// Whether the error happened before anything was sent upstream
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Validation(_))
    }
}
