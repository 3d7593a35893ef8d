//! Post-completion execution statistics.

use serde::{Deserialize, Serialize};

/// Counters and timing describing how a submitted plan ran.
///
/// Produced by the runtime only after the plan reached a terminal state;
/// immutable once handed to callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statistics {
    /// Unique submission id the plan ran under, when one was assigned.
    pub submission_id: Option<String>,
    /// Number of stages that executed successfully.
    pub executed_stages: usize,
    /// Number of stages that failed.
    pub failed_stages: usize,
    /// Records read from all sources.
    pub records_read: usize,
    /// Records written to all sinks.
    pub records_written: usize,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u128,
}

impl Statistics {
    /// Total number of stages the runtime attempted.
    pub fn total_stages(&self) -> usize {
        self.executed_stages + self.failed_stages
    }

    /// Whether the run completed without stage failures.
    pub fn is_clean(&self) -> bool {
        self.failed_stages == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let stats = Statistics {
            executed_stages: 4,
            failed_stages: 1,
            ..Statistics::default()
        };
        assert_eq!(stats.total_stages(), 5);
        assert!(!stats.is_clean());
    }
}
