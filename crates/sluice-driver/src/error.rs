//! Error types for the driver crate.

use thiserror::Error;

use sluice_core::error::{CompileError, RuntimeError, SourceError};

/// Convenience alias for driver results.
pub type ExecResult<T> = Result<T, ExecError>;

/// Errors produced while orchestrating plan construction and execution.
///
/// `Clone` on purpose: a single cause may surface through both the
/// user-result slot and the plan-result slot of the orchestrator API.
#[derive(Debug, Clone, Error)]
pub enum ExecError {
    /// The plan had no valid translation.
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// The runtime rejected or failed the plan.
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// One or more sources failed validation.
    #[error("source validation error: {0}")]
    SourceValidation(#[from] SourceError),

    /// The caller-supplied computation failed.
    #[error("computation error: {0}")]
    Computation(String),

    /// The runtime reported the job stopped before completion.
    #[error("job was stopped before completion")]
    JobStopped,

    /// The execution could not reach a terminal state.
    #[error("execution aborted: {0}")]
    Aborted(String),
}
