//! check_mailcow_rspamd - Icinga/Nagios plugin entry point

mod cli;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use cli::Cli;
use mailcow_check_common::{CheckConfig, Error, LoggingConfig};
use mailcow_check_core::{CheckEvaluator, CheckReport, MailcowClient, MailcowClientConfig, TrafficStats};
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit code for invalid arguments, distinct from the four check states
const EXIT_USAGE: u8 = 64;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_USAGE } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    let config = match cli.into_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("check_mailcow_rspamd: {}", e);
            eprintln!("Try '--help' for more information.");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("check_mailcow_rspamd: {:#}", e);
    }

    let report = run_check(&config).await;
    println!("{}", report);

    ExitCode::from(report.state.exit_code() as u8)
}

async fn run_check(config: &CheckConfig) -> CheckReport {
    let evaluator = CheckEvaluator::new(config.min_back, config.thresholds(), config.always_ok);

    let client = match MailcowClientConfig::try_from(config).and_then(MailcowClient::new) {
        Ok(client) => client,
        Err(e) => return CheckReport::unknown(e),
    };

    match client.fetch_history(config.count).await {
        Ok(entries) => {
            let now = Utc::now().timestamp();
            debug!(entries = entries.len(), now, "Evaluating rspamd history");

            let report = evaluator.evaluate(&entries, now);
            if config.details {
                report.with_long_output(TrafficStats::collect(&entries, now).render())
            } else {
                report
            }
        }
        Err(Error::MalformedHistory(reason)) => {
            warn!(code = "MALFORMED_HISTORY", "{}", reason);
            evaluator.no_data(reason)
        }
        Err(e) => {
            warn!(code = e.code(), "rspamd history fetch failed: {}", e);
            CheckReport::unknown(e)
        }
    }
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    // stdout carries the plugin output
    let registry = tracing_subscriber::registry().with(filter);
    let installed = if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    installed.context("failed to install log subscriber")
}
