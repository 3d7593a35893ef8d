//! Shared types and contracts for the sluice workspace.
//!
//! This crate holds everything the other members agree on:
//!
//! - **`types`**: configuration, statistics, records, and the plan graph
//! - **`error`**: the error taxonomy (compile, runtime, source validation)
//! - **`io`**: the `Source`/`Sink` adapter traits
//! - **`runtime`**: the capability traits a runtime must implement to
//!   accept, execute, and report on a compiled plan
//!
//! The crate defines no execution behavior of its own; the engine lives in
//! `sluice-runtime` and the lifecycle orchestration in `sluice-driver`.

pub mod error;
pub mod io;
pub mod runtime;
pub mod types;

pub use error::{CompileError, RuntimeError, SourceError, SourceFailure};
pub use io::{Sink, Source};
pub use runtime::{PlanConnector, PlanListener, PlanOutcome, Runtime, SubmittedPlan};
pub use types::{
    Config, NodeId, Plan, PlanGraph, PlanId, PlanNode, SinkNode, Stage, Statistics, Value,
};
