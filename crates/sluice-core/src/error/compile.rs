//! Compilation errors.
//!
//! Raised when a plan cannot be translated into a submittable unit. These
//! never cross the driver boundary as panics; the orchestrator captures
//! them as failure values.

use thiserror::Error;

/// Errors produced while compiling a plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The plan graph is malformed (dangling references, empty, cyclic).
    #[error("plan validation failed: {0}")]
    Validation(String),

    /// The runtime cannot translate the plan (unsupported stage
    /// combination, missing capability).
    #[error("plan translation failed: {0}")]
    Translation(String),
}
