//! Error taxonomy for the sluice workspace.
//!
//! Every failure surfaces as a value through `Result` (or a failed future
//! at the driver boundary); nothing in the library recovers silently. All
//! enums here are `Clone` so a single cause can be reported through more
//! than one result slot without loss.

mod compile;
mod runtime;
mod source;

pub use compile::CompileError;
pub use runtime::RuntimeError;
pub use source::{SourceError, SourceFailure};
