//! Execution context - the unit of dependency injection.

use std::sync::Arc;

use sluice_core::runtime::{PlanOutcome, Runtime, SubmittedPlan};
use sluice_core::types::{Config, Plan, Statistics};

use crate::bridge::{CompletionBridge, StatsFuture};
use crate::error::ExecResult;
use crate::plan_state::{PlanStateGuard, PlanStateRegistry};

/// Bundles a configuration snapshot, the plan under construction, and the
/// target runtime for one execution.
///
/// Contexts are short-lived: the orchestrator creates one per invocation
/// so that re-running the same computation twice yields two independent
/// plans. The fields themselves are immutable references; only the plan's
/// interior is mutated, and only while the computation runs.
#[derive(Clone)]
pub struct ExecutionContext {
    config: Config,
    plan: Plan,
    runtime: Arc<dyn Runtime>,
    plan_state: Arc<PlanStateRegistry>,
}

impl ExecutionContext {
    /// Create a context over an existing plan.
    pub fn new(
        config: Config,
        plan: Plan,
        runtime: Arc<dyn Runtime>,
        plan_state: Arc<PlanStateRegistry>,
    ) -> Self {
        Self {
            config,
            plan,
            runtime,
            plan_state,
        }
    }

    /// The configuration snapshot.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The plan under construction.
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// The target runtime.
    pub fn runtime(&self) -> &Arc<dyn Runtime> {
        &self.runtime
    }

    /// The plan-state registry this context books into.
    pub fn plan_state(&self) -> &Arc<PlanStateRegistry> {
        &self.plan_state
    }

    /// Compile the plan into a submittable unit.
    ///
    /// Assigns the plan's unique id into a derived configuration, then
    /// asks the runtime to translate. Translation failures are captured as
    /// values; nothing is thrown past this boundary. The caller owns
    /// plan-state cleanup (see [`Execution`](crate::Execution), which
    /// guards every exit path).
    pub fn compile(&self) -> ExecResult<Arc<dyn SubmittedPlan>> {
        let unique_id = self.plan_state.unique_id_for(&self.plan);
        let config = self.config.with_unique_id(unique_id);

        tracing::debug!(plan = %self.plan.id(), submission = %unique_id, "compiling plan");

        let connector = self.runtime.connector(&config);
        let handle = connector.connect(&self.plan)?;
        Ok(handle)
    }

    /// Compile and submit, returning the future of the run's statistics.
    ///
    /// On compile failure the future is already failed and nothing was
    /// submitted. Plan-state bookkeeping for this context is released
    /// before returning.
    pub fn run(&self) -> StatsFuture {
        let _guard = PlanStateGuard::new(Arc::clone(&self.plan_state), self.plan.id());
        match self.compile() {
            Ok(handle) => CompletionBridge::start(handle),
            Err(error) => StatsFuture::failed(error),
        }
    }

    /// Compile, submit, and block until the runtime reports a terminal
    /// state.
    ///
    /// Plan-state bookkeeping for this context is released before
    /// returning, whatever the outcome.
    pub fn wait_for(&self) -> ExecResult<Statistics> {
        let _guard = PlanStateGuard::new(Arc::clone(&self.plan_state), self.plan.id());
        let handle = self.compile()?;
        wait_terminal(handle)
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("plan", &self.plan)
            .field("app_name", &self.config.app_name())
            .finish()
    }
}

/// Block on the handle's native wait and translate the terminal state.
pub(crate) fn wait_terminal(handle: Arc<dyn SubmittedPlan>) -> ExecResult<Statistics> {
    match handle.block_until_complete() {
        PlanOutcome::Completed => Ok(handle.statistics()),
        PlanOutcome::Failed(cause) => Err(cause.into()),
        PlanOutcome::Stopped => Err(crate::ExecError::JobStopped),
    }
}
