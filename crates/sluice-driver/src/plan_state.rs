//! Per-plan bookkeeping with guaranteed teardown.
//!
//! The registry is process-wide mutable state keyed by plan identity. It is
//! always injected (the orchestrator owns an `Arc`), never reached through
//! a global, so tests substitute a fresh registry per case. Entries are
//! created lazily on first use and must never outlive the execution context
//! that created them; [`PlanStateGuard`] enforces that on every exit path.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use sluice_core::error::SourceError;
use sluice_core::types::{Plan, PlanId};

use crate::error::ExecResult;

/// Bookkeeping for one in-flight plan.
#[derive(Debug, Default)]
struct PlanEntry {
    /// Indexes (registration order) of sources already confirmed valid.
    validated: HashSet<usize>,
    /// Unique submission id, assigned on first access.
    unique_id: Option<Uuid>,
}

/// Registry mapping in-progress plan identities to auxiliary bookkeeping.
#[derive(Debug, Default)]
pub struct PlanStateRegistry {
    entries: DashMap<PlanId, PlanEntry>,
}

impl PlanStateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable unique id for this plan's lifetime, created on first access.
    ///
    /// Used to namespace configuration keys so concurrent unrelated plans
    /// over the same configuration object cannot collide.
    pub fn unique_id_for(&self, plan: &Plan) -> Uuid {
        let mut entry = self.entries.entry(plan.id()).or_default();
        *entry.unique_id.get_or_insert_with(Uuid::now_v7)
    }

    /// Validate every registered source not yet confirmed valid.
    ///
    /// Successes are marked so repeat calls are cheap; failures are
    /// aggregated into a single report. Sources already confirmed never
    /// re-raise.
    pub fn validate_sources(&self, plan: &Plan) -> ExecResult<()> {
        let mut entry = self.entries.entry(plan.id()).or_default();
        let mut failures = Vec::new();

        for (index, source) in plan.sources().iter().enumerate() {
            if entry.validated.contains(&index) {
                continue;
            }
            match source.validate() {
                Ok(()) => {
                    entry.validated.insert(index);
                }
                Err(failure) => failures.push(failure),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(SourceError::aggregate(failures).into())
        }
    }

    /// Remove the entry for a plan. Idempotent; clearing an unknown plan
    /// is a no-op.
    pub fn clear(&self, plan: PlanId) {
        self.entries.remove(&plan);
    }

    /// Whether the registry currently holds an entry for the plan.
    pub fn contains(&self, plan: PlanId) -> bool {
        self.entries.contains_key(&plan)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scoped-release guard for one plan's registry entry.
///
/// Dropping the guard clears the entry, so normal returns, early error
/// returns, and unwinds all release bookkeeping exactly once.
pub(crate) struct PlanStateGuard {
    registry: Arc<PlanStateRegistry>,
    plan: PlanId,
}

impl PlanStateGuard {
    pub(crate) fn new(registry: Arc<PlanStateRegistry>, plan: PlanId) -> Self {
        Self { registry, plan }
    }
}

impl Drop for PlanStateGuard {
    fn drop(&mut self) {
        self.registry.clear(self.plan);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use sluice_core::error::{RuntimeError, SourceFailure};
    use sluice_core::io::Source;
    use sluice_core::types::Value;

    use super::*;

    struct FlakySource {
        name: String,
        ok: bool,
        validations: Arc<AtomicUsize>,
    }

    impl Source for FlakySource {
        fn name(&self) -> &str {
            &self.name
        }
        fn validate(&self) -> Result<(), SourceFailure> {
            self.validations.fetch_add(1, Ordering::SeqCst);
            if self.ok {
                Ok(())
            } else {
                Err(SourceFailure {
                    name: self.name.clone(),
                    message: "missing input".to_string(),
                })
            }
        }
        fn read(&self) -> Result<Vec<Value>, RuntimeError> {
            Ok(vec![])
        }
    }

    fn source(name: &str, ok: bool, validations: &Arc<AtomicUsize>) -> Arc<dyn Source> {
        Arc::new(FlakySource {
            name: name.to_string(),
            ok,
            validations: Arc::clone(validations),
        })
    }

    #[test]
    fn test_unique_id_is_stable_per_plan() {
        let registry = PlanStateRegistry::new();
        let plan_a = Plan::new(None);
        let plan_b = Plan::new(None);

        let id_a = registry.unique_id_for(&plan_a);
        assert_eq!(registry.unique_id_for(&plan_a), id_a);
        assert_ne!(registry.unique_id_for(&plan_b), id_a);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let registry = PlanStateRegistry::new();
        let plan = Plan::new(None);

        registry.unique_id_for(&plan);
        assert!(registry.contains(plan.id()));

        registry.clear(plan.id());
        registry.clear(plan.id());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_validated_sources_are_not_rechecked() {
        let registry = PlanStateRegistry::new();
        let plan = Plan::new(None);
        let validations = Arc::new(AtomicUsize::new(0));
        plan.add_source(source("good", true, &validations));

        registry.validate_sources(&plan).unwrap();
        registry.validate_sources(&plan).unwrap();
        assert_eq!(validations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failures_aggregate_and_do_not_mask_good_sources() {
        let registry = PlanStateRegistry::new();
        let plan = Plan::new(None);
        let validations = Arc::new(AtomicUsize::new(0));
        plan.add_source(source("good", true, &validations));
        plan.add_source(source("bad-1", false, &validations));
        plan.add_source(source("bad-2", false, &validations));

        let err = registry.validate_sources(&plan).unwrap_err();
        match err {
            crate::ExecError::SourceValidation(report) => {
                let display = report.to_string();
                assert!(display.contains("bad-1"));
                assert!(display.contains("bad-2"));
                assert!(!display.contains("good"));
            }
            other => panic!("expected source validation error, got {other}"),
        }

        // the good source was marked; only the bad ones are rechecked
        let _ = registry.validate_sources(&plan);
        assert_eq!(validations.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_guard_clears_on_drop() {
        let registry = Arc::new(PlanStateRegistry::new());
        let plan = Plan::new(None);
        {
            let _guard = PlanStateGuard::new(Arc::clone(&registry), plan.id());
            registry.unique_id_for(&plan);
            assert!(registry.contains(plan.id()));
        }
        assert!(!registry.contains(plan.id()));
    }
}
