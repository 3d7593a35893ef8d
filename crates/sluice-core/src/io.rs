//! Source and sink adapter traits.
//!
//! Concrete adapters (in-memory cells, text-line files) live in
//! `sluice-flow`; the engine and driver only ever see these trait objects.

use std::sync::Arc;

use crate::error::{RuntimeError, SourceFailure};
use crate::types::Value;

/// An external input a plan reads records from.
pub trait Source: Send + Sync {
    /// Stable name used in diagnostics and validation reports.
    fn name(&self) -> &str;

    /// Confirm the source's preconditions (input exists, is readable)
    /// without reading it.
    fn validate(&self) -> Result<(), SourceFailure>;

    /// Read every record the source holds.
    fn read(&self) -> Result<Vec<Value>, RuntimeError>;
}

/// An external output a plan writes records to.
pub trait Sink: Send + Sync {
    /// Stable name used in diagnostics.
    fn name(&self) -> &str;

    /// Write the final records for one sink node.
    fn write(&self, records: &[Value]) -> Result<(), RuntimeError>;
}

impl std::fmt::Debug for dyn Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Source({})", self.name())
    }
}

impl std::fmt::Debug for dyn Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sink({})", self.name())
    }
}

/// Shared source handle as stored in the plan graph.
pub type SourceRef = Arc<dyn Source>;

/// Shared sink handle as stored in the plan graph.
pub type SinkRef = Arc<dyn Sink>;
