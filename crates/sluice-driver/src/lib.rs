//! sluice driver - execution contexts, orchestration, and completion bridging
//!
//! This crate is the lifecycle core of the workspace:
//!
//! - **`context`**: [`ExecutionContext`], the unit of dependency injection
//!   bundling a configuration snapshot, the plan under construction, and
//!   the target runtime
//! - **`execution`**: the [`Execution`] orchestrator turning a caller's
//!   computation into a compiled, submitted plan
//! - **`plan_state`**: per-plan bookkeeping with guaranteed teardown
//! - **`bridge`**: [`CompletionBridge`], converting listener callbacks into
//!   an awaitable [`StatsFuture`]
//!
//! # Architecture
//!
//! ```text
//!            ┌──────────────┐
//!            │  Execution   │ build → compile → submit → await
//!            └──────┬───────┘
//!                   │ creates (one per invocation)
//!            ┌──────▼───────┐       ┌───────────────┐
//!            │ Execution    │──────▶│  PlanState    │ created before compile,
//!            │ Context      │       │  registry     │ cleared on every exit
//!            └──────┬───────┘       └───────────────┘
//!                   │ connect
//!            ┌──────▼───────┐       ┌───────────────┐
//!            │   Runtime    │──────▶│ Completion    │ listener → future
//!            │  (engine)    │       │ Bridge        │
//!            └──────────────┘       └───────────────┘
//! ```

mod bridge;
mod context;
mod error;
mod execution;
mod plan_state;

pub use bridge::{CompletionBridge, StatsFuture};
pub use context::ExecutionContext;
pub use error::{ExecError, ExecResult};
pub use execution::Execution;
pub use plan_state::PlanStateRegistry;
