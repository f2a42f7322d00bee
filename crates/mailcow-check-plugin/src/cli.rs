//! Command-line arguments

use clap::Parser;
use mailcow_check_common::{CheckConfig, Result};
use std::path::PathBuf;

/// Checks Mailcow rspamd mail flow: seconds since the last mail and recent
/// spam-filtering actions
#[derive(Parser, Debug)]
#[command(name = "check_mailcow_rspamd", version, about, long_about = None)]
pub struct Cli {
    /// Server address of your Mailcow instance, e.g. https://mail.example.com
    #[arg(long, value_name = "URL", env = "MAILCOW_SERVER")]
    pub server: Option<String>,

    /// Mailcow API key, can be generated in the Mailcow UI
    #[arg(long = "apiKey", value_name = "KEY", env = "MAILCOW_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Count of history entries to request [default: 200]
    #[arg(long, value_name = "N")]
    pub count: Option<u32>,

    /// Number of minutes to look back for action counts [default: 5]
    #[arg(long = "minBack", value_name = "MINUTES")]
    pub min_back: Option<u64>,

    /// Critical threshold in seconds since the last mail [default: 3600]
    #[arg(short = 'c', long, value_name = "SECS")]
    pub critical: Option<i64>,

    /// Warning threshold in seconds since the last mail [default: 1800]
    #[arg(short = 'w', long, value_name = "SECS")]
    pub warning: Option<i64>,

    /// Always return OK, metrics are still reported
    #[arg(long)]
    pub always_ok: bool,

    /// HTTP request timeout in seconds [default: 10]
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,

    /// Append 24h throughput and per-address spam ratios
    #[arg(long)]
    pub details: bool,

    /// TOML file with default settings
    #[arg(long, value_name = "PATH", env = "MAILCOW_CHECK_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Resolve the effective configuration, flags winning over the file
    pub fn into_config(self) -> Result<CheckConfig> {
        let mut config = CheckConfig::load(self.config.as_deref())?;

        if let Some(server) = self.server {
            config.server = Some(server);
        }
        if let Some(api_key) = self.api_key {
            config.api_key = Some(api_key);
        }
        if let Some(count) = self.count {
            config.count = count;
        }
        if let Some(min_back) = self.min_back {
            config.min_back = min_back;
        }
        if let Some(critical) = self.critical {
            config.critical = critical;
        }
        if let Some(warning) = self.warning {
            config.warning = warning;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        config.always_ok |= self.always_ok;
        config.insecure |= self.insecure;
        config.details |= self.details;

        Ok(config)
    }
}
