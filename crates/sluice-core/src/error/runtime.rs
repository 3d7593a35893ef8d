//! Errors raised while executing a submitted plan.

use thiserror::Error;

use crate::types::NodeId;

/// Errors that can happen while the runtime executes plan stages.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// A transform stage failed while processing records.
    #[error("stage {node} failed: {message}")]
    Stage {
        /// Plan node the failure occurred in.
        node: NodeId,
        /// Human-readable cause.
        message: String,
    },

    /// A source could not be read.
    #[error("source error: {0}")]
    Source(String),

    /// A sink could not be written.
    #[error("sink error: {0}")]
    Sink(String),

    /// A record could not be encoded or decoded.
    #[error("record error: {0}")]
    Data(String),

    /// The runtime reached an inconsistent internal state.
    #[error("runtime state error: {0}")]
    State(String),
}
