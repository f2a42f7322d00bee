//! Monitoring plugin performance data
//!
//! Counter metrics in the `'label'=value;;;[min];` form from the Nagios
//! plugin development guidelines. Warning, critical and max stay empty.

use std::fmt;

/// A single perfdata counter
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    label: String,
    value: u64,
    min: Option<i64>,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: u64) -> Self {
        Self {
            label: label.into(),
            value,
            min: None,
        }
    }

    pub fn with_min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // single quotes inside a label are doubled
        write!(f, "'{}'={};;;", self.label.replace('\'', "''"), self.value)?;
        if let Some(min) = self.min {
            write!(f, "{}", min)?;
        }
        f.write_str(";")
    }
}

/// Join metrics into a perfdata block
pub fn render(metrics: &[Metric]) -> String {
    metrics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_counter_metric() {
        assert_eq!(
            Metric::new("soft reject", 3).with_min(0).to_string(),
            "'soft reject'=3;;;0;"
        );
    }

    #[test]
    fn test_label_quote_escaped() {
        assert_eq!(Metric::new("it's", 1).to_string(), "'it''s'=1;;;;");
    }

    #[test]
    fn test_render_joins_with_space() {
        let block = render(&[Metric::new("a", 1).with_min(0), Metric::new("b", 2).with_min(0)]);
        assert_eq!(block, "'a'=1;;;0; 'b'=2;;;0;");
    }
}
