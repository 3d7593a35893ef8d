//! The orchestrator: build, compile, submit, await, tear down.

use std::sync::Arc;

use sluice_core::runtime::{Runtime, SubmittedPlan};
use sluice_core::types::{Config, Plan, Statistics};

use crate::bridge::{CompletionBridge, StatsFuture};
use crate::context::{wait_terminal, ExecutionContext};
use crate::error::ExecResult;
use crate::plan_state::{PlanStateGuard, PlanStateRegistry};

/// Orchestrates one computation from description to terminal state.
///
/// Every invocation constructs a fresh [`ExecutionContext`] (and therefore
/// a fresh plan), runs the caller's computation against it, compiles, and
/// hands the result to the runtime. Plan-state bookkeeping for the
/// context's plan is released on every exit path - normal return, failed
/// computation, failed compilation, or unwind - before the call returns.
///
/// The user-level result is returned alongside the execution outcome in
/// all cases, since it may carry caller-owned handles for reading results
/// once the run completes.
pub struct Execution {
    plan_state: Arc<PlanStateRegistry>,
}

impl Default for Execution {
    fn default() -> Self {
        Self::new(Arc::new(PlanStateRegistry::new()))
    }
}

impl Execution {
    /// Create an orchestrator over an injected plan-state registry.
    pub fn new(plan_state: Arc<PlanStateRegistry>) -> Self {
        Self { plan_state }
    }

    /// The registry this orchestrator books plan state into.
    pub fn plan_state(&self) -> &Arc<PlanStateRegistry> {
        &self.plan_state
    }

    /// Run the computation against a fresh context and compile the plan it
    /// built.
    ///
    /// Returns the user-level result and the compiled handle as separate
    /// slots: a computation failure fills both with the same cause, while
    /// a compile failure still returns the user result.
    pub fn build_plan<T, F>(
        &self,
        config: &Config,
        runtime: &Arc<dyn Runtime>,
        computation: F,
    ) -> (ExecResult<T>, ExecResult<Arc<dyn SubmittedPlan>>)
    where
        F: FnOnce(&ExecutionContext) -> ExecResult<T>,
    {
        let plan = Plan::new(config.app_name().map(str::to_string));
        let guard = PlanStateGuard::new(Arc::clone(&self.plan_state), plan.id());

        let context = ExecutionContext::new(
            config.clone(),
            plan,
            Arc::clone(runtime),
            Arc::clone(&self.plan_state),
        );

        tracing::debug!(plan = %context.plan().id(), "building plan");
        let user = computation(&context);

        let compiled = match &user {
            Ok(_) => context.compile(),
            Err(error) => {
                tracing::debug!(plan = %context.plan().id(), error = %error, "computation failed");
                Err(error.clone())
            }
        };

        // release bookkeeping before handing anything back
        drop(guard);
        (user, compiled)
    }

    /// Build, compile, and submit; returns the future of the run's
    /// statistics without blocking.
    ///
    /// On compile failure the future is already failed and the runtime's
    /// submit path was never reached.
    pub fn run<T, F>(
        &self,
        config: &Config,
        runtime: &Arc<dyn Runtime>,
        computation: F,
    ) -> (ExecResult<T>, StatsFuture)
    where
        F: FnOnce(&ExecutionContext) -> ExecResult<T>,
    {
        let (user, compiled) = self.build_plan(config, runtime, computation);
        let future = match compiled {
            Ok(handle) => CompletionBridge::start(handle),
            Err(error) => StatsFuture::failed(error),
        };
        (user, future)
    }

    /// Build, compile, submit, and block the calling thread until the
    /// runtime reports a terminal state.
    pub fn wait_for<T, F>(
        &self,
        config: &Config,
        runtime: &Arc<dyn Runtime>,
        computation: F,
    ) -> (ExecResult<T>, ExecResult<Statistics>)
    where
        F: FnOnce(&ExecutionContext) -> ExecResult<T>,
    {
        let (user, compiled) = self.build_plan(config, runtime, computation);
        let stats = match compiled {
            Ok(handle) => wait_terminal(handle),
            Err(error) => Err(error),
        };
        (user, stats)
    }

    /// Ready-made computation validating every registered source.
    ///
    /// Compose it before or after your own computation to opt into eager
    /// source validation:
    ///
    /// ```ignore
    /// let (result, stats) = execution.wait_for(&conf, &runtime, |ctx| {
    ///     build_pipeline(ctx)?;
    ///     Execution::validate_sources(ctx)
    /// });
    /// ```
    pub fn validate_sources(context: &ExecutionContext) -> ExecResult<()> {
        context.plan_state().validate_sources(context.plan())
    }
}
