//! Typed combinators over the sluice plan graph.
//!
//! This crate is the surface user code composes plans with:
//!
//! - **[`TypedPipe`]**: a typed handle onto one node of a plan; combinators
//!   register new stages and hand back a handle onto the result
//! - **[`ValuePipe`]**: an optional single value that may be absent, known
//!   immediately, or only discoverable by running a subcomputation
//! - **`adapters`**: in-memory and text-line sources and sinks
//!
//! Everything here is a description; nothing reads or transforms records
//! until the plan is compiled and submitted through `sluice-driver`.

pub mod adapters;
mod typed;
mod value_pipe;

pub use adapters::{MemorySink, MemorySource, TextLineSink, TextLineSource};
pub use typed::TypedPipe;
pub use value_pipe::ValuePipe;
