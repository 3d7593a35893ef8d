//! Capability traits a runtime implements to accept and execute plans.
//!
//! The driver never talks to a concrete engine; it goes through these
//! object-safe seams so that tests can substitute recording stand-ins and
//! alternative engines can be slotted in without touching the lifecycle
//! core.

use std::sync::Arc;

use crate::error::{CompileError, RuntimeError};
use crate::types::{Config, Plan, Statistics};

/// Terminal state of a submitted plan, as reported to listeners.
#[derive(Debug, Clone)]
pub enum PlanOutcome {
    /// The plan ran to completion.
    Completed,
    /// The plan failed; the cause is passed through unchanged.
    Failed(RuntimeError),
    /// The plan was stopped before completion.
    Stopped,
}

/// Callback attached to a submitted plan's native notification mechanism.
///
/// Fired from whatever thread the runtime completes on. A listener
/// attached after the plan already reached a terminal state is fired
/// immediately with that state.
pub trait PlanListener: Send + Sync {
    /// Observe the plan's terminal state.
    fn on_outcome(&self, outcome: PlanOutcome);
}

/// A compiled plan the runtime has accepted and can execute.
pub trait SubmittedPlan: Send + Sync {
    /// Begin executing. Idempotent; later calls are no-ops.
    fn start(&self);

    /// Attach a completion listener.
    fn attach_listener(&self, listener: Arc<dyn PlanListener>);

    /// Block the calling thread until the plan reaches a terminal state,
    /// starting it if necessary. Returns the failure cause for failed or
    /// stopped runs.
    fn block_until_complete(&self) -> PlanOutcome;

    /// Snapshot of the run's statistics. Only meaningful once a terminal
    /// state has been reached.
    fn statistics(&self) -> Statistics;
}

/// Translates plans into submittable units under one configuration.
pub trait PlanConnector {
    /// Validate and compile the plan.
    ///
    /// Returns a handle ready to start, or the reason the plan has no
    /// valid translation. Must not begin execution.
    fn connect(&self, plan: &Plan) -> Result<Arc<dyn SubmittedPlan>, CompileError>;
}

/// An execution engine.
pub trait Runtime: Send + Sync {
    /// Create a connector bound to the given configuration snapshot.
    fn connector(&self, config: &Config) -> Box<dyn PlanConnector>;
}
