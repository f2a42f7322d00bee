//! 24h traffic statistics
//!
//! Per-address spam ratios for inbound recipients and outbound senders,
//! rendered as plugin long output.

use crate::history::{LogEntry, UNKNOWN_USER};
use mailcow_check_common::Action;
use std::collections::HashMap;

const DAY_SECS: i64 = 24 * 60 * 60;

/// Number of addresses listed per direction
pub const TOP_ADDRESSES: usize = 10;

/// Ham/spam counts for one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressStats {
    pub address: String,
    pub spam: u64,
    pub ham: u64,
}

impl AddressStats {
    fn new(address: String) -> Self {
        Self {
            address,
            spam: 0,
            ham: 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.spam + self.ham
    }

    /// Share of spam in `0.0..=1.0`
    pub fn spam_ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.spam as f64 / total as f64,
        }
    }
}

enum Verdict {
    Ham,
    Spam,
}

fn verdict(action: &Action) -> Option<Verdict> {
    match action {
        Action::NoAction => Some(Verdict::Ham),
        // deferred, the retry shows up as its own entry
        Action::Greylist | Action::SoftReject => None,
        _ => Some(Verdict::Spam),
    }
}

/// Mail flow over the last 24 hours
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafficStats {
    pub throughput_24h: u64,
    pub incoming: Vec<AddressStats>,
    pub outgoing: Vec<AddressStats>,
}

impl TrafficStats {
    pub fn collect(entries: &[LogEntry], now: i64) -> Self {
        let mut throughput_24h = 0;
        let mut incoming: HashMap<String, AddressStats> = HashMap::new();
        let mut outgoing: HashMap<String, AddressStats> = HashMap::new();

        for entry in entries {
            if now.saturating_sub(entry.timestamp).max(0) >= DAY_SECS {
                continue;
            }
            throughput_24h += 1;

            let user = entry.user.as_deref().unwrap_or(UNKNOWN_USER);
            let (bucket, address) = if user == UNKNOWN_USER || user.is_empty() {
                match entry.recipients.first() {
                    Some(rcpt) => (&mut incoming, rcpt.to_lowercase()),
                    None => continue,
                }
            } else {
                (&mut outgoing, user.to_string())
            };

            let Some(kind) = verdict(&entry.action) else {
                continue;
            };

            let stats = bucket
                .entry(address.clone())
                .or_insert_with(|| AddressStats::new(address));
            match kind {
                Verdict::Ham => stats.ham += 1,
                Verdict::Spam => stats.spam += 1,
            }
        }

        Self {
            throughput_24h,
            incoming: top_by_spam_ratio(incoming),
            outgoing: top_by_spam_ratio(outgoing),
        }
    }

    /// Long output lines: throughput and one table per direction
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("Throughput: {} messages/day", self.throughput_24h)];

        if !self.incoming.is_empty() {
            lines.push("Incoming 24h stats:".to_string());
            lines.extend(render_table("Recipient", &self.incoming));
        }
        if !self.outgoing.is_empty() {
            lines.push("Outgoing 24h stats:".to_string());
            lines.extend(render_table("Sender", &self.outgoing));
        }

        lines
    }
}

/// Busiest addresses first, then reordered by spam ratio
fn top_by_spam_ratio(map: HashMap<String, AddressStats>) -> Vec<AddressStats> {
    let mut stats: Vec<AddressStats> = map.into_values().collect();
    stats.sort_by(|a, b| {
        b.total()
            .cmp(&a.total())
            .then_with(|| a.address.cmp(&b.address))
    });
    stats.truncate(TOP_ADDRESSES);
    stats.sort_by(|a, b| {
        b.spam_ratio()
            .total_cmp(&a.spam_ratio())
            .then_with(|| b.total().cmp(&a.total()))
            .then_with(|| a.address.cmp(&b.address))
    });
    stats
}

fn render_table(address_header: &str, rows: &[AddressStats]) -> Vec<String> {
    let header = [address_header, "Spam %", "Mails total"];
    let cells: Vec<[String; 3]> = rows
        .iter()
        .map(|s| {
            [
                s.address.clone(),
                format!("{:.2}", s.spam_ratio() * 100.0),
                s.total().to_string(),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |row: [&str; 3], sep: &str| {
        row.iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(sep)
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(cells.len() + 2);
    lines.push(format_row(header, " ! "));
    let dashes = widths.map(|w| "-".repeat(w));
    lines.push(format_row([&dashes[0], &dashes[1], &dashes[2]], "-+-"));
    for row in &cells {
        lines.push(format_row([&row[0], &row[1], &row[2]], " ! "));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NOW: i64 = 1_700_000_000;

    fn inbound(age: i64, action: Action, rcpt: &str) -> LogEntry {
        LogEntry::new(NOW - age, action)
            .with_user(UNKNOWN_USER)
            .with_recipient(rcpt)
    }

    fn outbound(age: i64, action: Action, user: &str) -> LogEntry {
        LogEntry::new(NOW - age, action)
            .with_user(user)
            .with_recipient("someone@elsewhere.org")
    }

    #[test]
    fn test_throughput_counts_last_day_only() {
        let entries = [
            inbound(10, Action::NoAction, "a@example.com"),
            inbound(DAY_SECS - 1, Action::NoAction, "a@example.com"),
            inbound(DAY_SECS, Action::NoAction, "a@example.com"),
        ];
        assert_eq!(TrafficStats::collect(&entries, NOW).throughput_24h, 2);
    }

    #[test]
    fn test_inbound_ratio_by_recipient() {
        let entries = [
            inbound(10, Action::NoAction, "Alice@Example.com"),
            inbound(20, Action::Reject, "alice@example.com"),
            inbound(30, Action::AddHeader, "alice@example.com"),
            inbound(40, Action::Greylist, "alice@example.com"),
            inbound(50, Action::NoAction, "bob@example.com"),
        ];
        let stats = TrafficStats::collect(&entries, NOW);

        assert_eq!(stats.throughput_24h, 5);
        assert!(stats.outgoing.is_empty());
        assert_eq!(
            stats.incoming,
            vec![
                AddressStats {
                    address: "alice@example.com".to_string(),
                    spam: 2,
                    ham: 1
                },
                AddressStats {
                    address: "bob@example.com".to_string(),
                    spam: 0,
                    ham: 1
                },
            ]
        );
    }

    #[test]
    fn test_outbound_keyed_by_user() {
        let entries = [
            outbound(10, Action::NoAction, "carol@example.com"),
            outbound(20, Action::RewriteSubject, "carol@example.com"),
        ];
        let stats = TrafficStats::collect(&entries, NOW);
        assert!(stats.incoming.is_empty());
        assert_eq!(stats.outgoing.len(), 1);
        assert_eq!(stats.outgoing[0].spam_ratio(), 0.5);
    }

    #[test]
    fn test_entries_without_addresses_skipped() {
        let entries = [LogEntry::new(NOW - 5, Action::Reject)];
        let stats = TrafficStats::collect(&entries, NOW);
        assert_eq!(stats.throughput_24h, 1);
        assert!(stats.incoming.is_empty());
        assert!(stats.outgoing.is_empty());
    }

    #[test]
    fn test_top_ten_busiest() {
        let mut entries = Vec::new();
        for i in 0..12 {
            let rcpt = format!("user{:02}@example.com", i);
            for _ in 0..=i {
                entries.push(inbound(60, Action::NoAction, &rcpt));
            }
        }
        let stats = TrafficStats::collect(&entries, NOW);
        assert_eq!(stats.incoming.len(), TOP_ADDRESSES);
        assert!(stats.incoming.iter().all(|s| s.address != "user00@example.com"));
        assert!(stats.incoming.iter().all(|s| s.address != "user01@example.com"));
        assert_eq!(stats.incoming[0].address, "user11@example.com");
    }

    #[test]
    fn test_render() {
        let entries = [
            inbound(10, Action::Reject, "alice@example.com"),
            inbound(20, Action::NoAction, "alice@example.com"),
            inbound(30, Action::NoAction, "bob@example.com"),
        ];
        let lines = TrafficStats::collect(&entries, NOW).render();
        assert_eq!(
            lines,
            vec![
                "Throughput: 3 messages/day",
                "Incoming 24h stats:",
                "Recipient         ! Spam % ! Mails total",
                "------------------+--------+------------",
                "alice@example.com ! 50.00  ! 2",
                "bob@example.com   ! 0.00   ! 1",
            ]
        );
    }
}
