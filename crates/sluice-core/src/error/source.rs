//! Source validation failures.

use thiserror::Error;

/// A single source failing its precondition check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("source '{name}': {message}")]
pub struct SourceFailure {
    /// Name of the failing source.
    pub name: String,
    /// Why validation failed.
    pub message: String,
}

/// Aggregate of every source that failed validation for one plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} source(s) failed validation: {}", .failures.len(), render(.failures))]
pub struct SourceError {
    /// Individual failures, in registration order.
    pub failures: Vec<SourceFailure>,
}

impl SourceError {
    /// Build an aggregate from individual failures.
    ///
    /// Callers are expected to pass a non-empty list; an empty aggregate
    /// renders as zero failures rather than panicking.
    pub fn aggregate(failures: Vec<SourceFailure>) -> Self {
        Self { failures }
    }
}

fn render(failures: &[SourceFailure]) -> String {
    failures
        .iter()
        .map(SourceFailure::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_display_lists_every_failure() {
        let err = SourceError::aggregate(vec![
            SourceFailure {
                name: "input-a".to_string(),
                message: "file not found".to_string(),
            },
            SourceFailure {
                name: "input-b".to_string(),
                message: "empty path".to_string(),
            },
        ]);

        let display = err.to_string();
        assert!(display.contains("2 source(s)"));
        assert!(display.contains("input-a"));
        assert!(display.contains("input-b"));
    }
}
