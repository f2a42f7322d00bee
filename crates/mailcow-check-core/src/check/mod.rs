//! Check evaluation
//!
//! Turns a fetched rspamd history into a monitoring plugin result:
//! - action tallies inside the lookback window
//! - seconds since the most recent mail, compared to the thresholds
//! - the status line and perfdata block

pub mod perfdata;
pub mod stats;

pub use perfdata::Metric;
pub use stats::{AddressStats, TrafficStats};

use crate::history::LogEntry;
use mailcow_check_common::{Action, CheckState, Thresholds};
use std::fmt;

/// Label of the bucket for actions rspamd reports that we don't know
pub const UNKNOWN_ACTION_LABEL: &str = "unknown";

/// Action counts within the lookback window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: [u64; 6],
    unknown: u64,
    total: u64,
    seconds_since_last: Option<i64>,
}

impl Tally {
    /// Count for a known action, or the unknown bucket for anything else
    pub fn count(&self, action: &Action) -> u64 {
        match action.index() {
            Some(i) => self.counts[i],
            None => self.unknown,
        }
    }

    pub fn unknown(&self) -> u64 {
        self.unknown
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Seconds since the most recent entry, `None` without entries
    pub fn seconds_since_last(&self) -> Option<i64> {
        self.seconds_since_last
    }

    fn add(&mut self, action: &Action) {
        match action.index() {
            Some(i) => self.counts[i] += 1,
            None => self.unknown += 1,
        }
        self.total += 1;
    }

    /// Perfdata metrics in fixed order, `unknown` only when non-zero
    pub fn metrics(&self) -> Vec<Metric> {
        let mut metrics: Vec<Metric> = Action::KNOWN
            .iter()
            .zip(self.counts.iter())
            .map(|(action, count)| Metric::new(action.as_str(), *count).with_min(0))
            .collect();

        if self.unknown > 0 {
            metrics.push(Metric::new(UNKNOWN_ACTION_LABEL, self.unknown).with_min(0));
        }
        metrics.push(Metric::new("total", self.total).with_min(0));
        metrics
    }
}

/// Rendered plugin result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub state: CheckState,
    pub summary: String,
    pub perfdata: String,
    pub long_output: Vec<String>,
}

impl CheckReport {
    /// UNKNOWN result for a failure before any data could be evaluated
    pub fn unknown(reason: impl fmt::Display) -> Self {
        Self {
            state: CheckState::Unknown,
            summary: format!("{} - {}", CheckState::Unknown, reason),
            perfdata: String::new(),
            long_output: Vec::new(),
        }
    }

    pub fn with_long_output(mut self, lines: Vec<String>) -> Self {
        self.long_output = lines;
        self
    }

    pub fn exit_code(&self) -> i32 {
        self.state.exit_code()
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.summary.trim())?;
        if !self.perfdata.is_empty() {
            write!(f, "|{}", self.perfdata.trim())?;
        }
        for line in &self.long_output {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}

/// Evaluates rspamd history against the configured thresholds
#[derive(Debug, Clone)]
pub struct CheckEvaluator {
    lookback_minutes: u64,
    thresholds: Thresholds,
    always_ok: bool,
}

impl CheckEvaluator {
    pub fn new(lookback_minutes: u64, thresholds: Thresholds, always_ok: bool) -> Self {
        Self {
            lookback_minutes,
            thresholds,
            always_ok,
        }
    }

    /// Count in-window actions and measure the age of the newest entry
    ///
    /// The window is inclusive: an entry exactly `lookback_minutes` old is
    /// counted. The newest entry sets the age even when it is outside the
    /// window. Entries with a blank action only count toward the age.
    pub fn tally(&self, entries: &[LogEntry], now: i64) -> Tally {
        let window = i64::try_from(self.lookback_minutes.saturating_mul(60)).unwrap_or(i64::MAX);
        let cutoff = now.saturating_sub(window);

        let mut tally = Tally::default();
        for entry in entries
            .iter()
            .filter(|e| e.timestamp >= cutoff && !e.action.is_blank())
        {
            tally.add(&entry.action);
        }

        tally.seconds_since_last = entries
            .iter()
            .map(|e| e.timestamp)
            .max()
            .map(|newest| now.saturating_sub(newest).max(0));

        tally
    }

    fn state_for(&self, seconds_since_last: Option<i64>) -> CheckState {
        if self.always_ok {
            return CheckState::Ok;
        }
        match seconds_since_last {
            Some(secs) => self.thresholds.classify(secs),
            None => CheckState::Unknown,
        }
    }

    /// Evaluate `entries` at time `now` (seconds since epoch)
    pub fn evaluate(&self, entries: &[LogEntry], now: i64) -> CheckReport {
        let tally = self.tally(entries, now);
        let state = self.state_for(tally.seconds_since_last);

        let summary = match tally.seconds_since_last {
            Some(secs) => format!("{} - {}s since last mail", state, secs),
            None => format!("{} - no mail found in rspamd history", state),
        };

        CheckReport {
            state,
            summary,
            perfdata: perfdata::render(&tally.metrics()),
            long_output: Vec::new(),
        }
    }

    /// Result for a history that could not be used, reported like an empty one
    pub fn no_data(&self, reason: impl fmt::Display) -> CheckReport {
        let state = self.state_for(None);
        CheckReport {
            state,
            summary: format!("{} - rspamd history unusable: {}", state, reason),
            perfdata: perfdata::render(&Tally::default().metrics()),
            long_output: Vec::new(),
        }
    }
}
