//! Optional single values over the plan graph.
//!
//! A [`ValuePipe`] holds at most one logical element and keeps track of how
//! much is statically known about it: nothing exists ([`ValuePipe::Empty`]),
//! the value is known immediately ([`ValuePipe::Literal`]), or discovering
//! it requires running a subcomputation ([`ValuePipe::Computed`]). The
//! combinators preserve that knowledge so the expensive path is only taken
//! when neither operand is statically known.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use sluice_core::error::{RuntimeError, SourceFailure};
use sluice_core::io::Source;
use sluice_core::runtime::Runtime;
use sluice_core::types::{record, Config, Value};

use sluice_driver::{ExecError, ExecutionContext, PlanStateRegistry};

use crate::adapters::MemorySink;
use crate::typed::TypedPipe;

/// An optional single value that may require a subcomputation to discover.
///
/// Invariant: at most one element logically exists. Materializing more than
/// one is a fatal error.
pub enum ValuePipe<T> {
    /// Known to hold nothing.
    Empty,
    /// Known immediately.
    Literal(T),
    /// Only discoverable by running the underlying pipe.
    Computed(TypedPipe<T>),
}

impl<T> ValuePipe<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + Clone + 'static,
{
    /// Short tag naming the variant, used in diagnostics.
    pub fn variant(&self) -> &'static str {
        match self {
            ValuePipe::Empty => "empty",
            ValuePipe::Literal(_) => "literal",
            ValuePipe::Computed(_) => "computed",
        }
    }

    /// Transform the value if one exists.
    ///
    /// For a computed pipe the transform is fused into the underlying
    /// pipeline, never executed here.
    pub fn map<U, F>(self, f: F) -> ValuePipe<U>
    where
        U: Serialize + DeserializeOwned + Send + Sync + Clone + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        match self {
            ValuePipe::Empty => ValuePipe::Empty,
            ValuePipe::Literal(v) => ValuePipe::Literal(f(v)),
            ValuePipe::Computed(pipe) => ValuePipe::Computed(pipe.map(f)),
        }
    }

    /// Drop the value unless it matches the predicate.
    pub fn filter<F>(self, predicate: F) -> ValuePipe<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        match self {
            ValuePipe::Empty => ValuePipe::Empty,
            ValuePipe::Literal(v) => {
                if predicate(&v) {
                    ValuePipe::Literal(v)
                } else {
                    ValuePipe::Empty
                }
            }
            ValuePipe::Computed(pipe) => ValuePipe::Computed(pipe.filter(predicate)),
        }
    }

    /// Pair this value with another optional value.
    ///
    /// The case table is ordered so a statically known operand always
    /// short-circuits: the pairwise cross over two underlying collections
    /// is only registered when neither side can be resolved without
    /// running. Construction never iterates either side.
    pub fn left_cross<U>(self, other: ValuePipe<U>) -> ValuePipe<(T, Option<U>)>
    where
        U: Serialize + DeserializeOwned + Send + Sync + Clone + 'static,
    {
        match other {
            ValuePipe::Empty => self.map(|t| (t, None)),
            ValuePipe::Literal(u) => self.map(move |t| (t, Some(u.clone()))),
            ValuePipe::Computed(that) => match self {
                ValuePipe::Empty => ValuePipe::Empty,
                ValuePipe::Literal(t) => {
                    let lifted = TypedPipe::<T>::from_source(
                        that.plan(),
                        Arc::new(LiteralSource::new(t)),
                    );
                    ValuePipe::Computed(lifted.left_cross(that))
                }
                ValuePipe::Computed(this) => ValuePipe::Computed(this.left_cross(that)),
            },
        }
    }

    /// Resolve to an `Option`, running the underlying pipe when needed.
    ///
    /// A computed pipe is drained through a fresh execution into a memory
    /// sink; at most two elements are inspected.
    ///
    /// # Panics
    ///
    /// Panics when the underlying collection materializes more than one
    /// element, violating the at-most-one invariant.
    pub fn to_option(
        self,
        config: &Config,
        runtime: Arc<dyn Runtime>,
    ) -> Result<Option<T>, ExecError> {
        match self {
            ValuePipe::Empty => Ok(None),
            ValuePipe::Literal(v) => Ok(Some(v)),
            ValuePipe::Computed(pipe) => {
                let sink = MemorySink::new("value-pipe-read");
                let cell = sink.cell();
                let plan = pipe.plan().clone();
                pipe.write(Arc::new(sink));

                let plan_state = Arc::new(PlanStateRegistry::new());
                let ctx = ExecutionContext::new(config.clone(), plan, runtime, plan_state);
                ctx.wait_for()?;

                let records = cell.lock();
                let mut elements = records.iter();
                match (elements.next(), elements.next()) {
                    (None, _) => Ok(None),
                    (Some(value), None) => {
                        let typed: T = record::decode(value.clone())?;
                        Ok(Some(typed))
                    }
                    (Some(_), Some(_)) => panic!("ValuePipe holds more than one value"),
                }
            }
        }
    }

    /// Identity transformation that reports the variant to the diagnostic
    /// log. A computed pipe is not forced: its records are logged lazily as
    /// they flow.
    pub fn debug(self, tag: &str) -> ValuePipe<T> {
        match self {
            ValuePipe::Empty => {
                tracing::debug!(tag, variant = "empty", "value pipe");
                ValuePipe::Empty
            }
            ValuePipe::Literal(v) => {
                match record::encode(&v) {
                    Ok(encoded) => {
                        tracing::debug!(tag, variant = "literal", value = %encoded, "value pipe")
                    }
                    Err(_) => tracing::debug!(tag, variant = "literal", "value pipe"),
                }
                ValuePipe::Literal(v)
            }
            ValuePipe::Computed(pipe) => {
                let tag = tag.to_string();
                ValuePipe::Computed(pipe.map(move |t| {
                    match record::encode(&t) {
                        Ok(encoded) => {
                            tracing::debug!(tag = %tag, variant = "computed", value = %encoded, "value pipe")
                        }
                        Err(_) => tracing::debug!(tag = %tag, variant = "computed", "value pipe"),
                    }
                    t
                }))
            }
        }
    }
}

impl<T> std::fmt::Debug for ValuePipe<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValuePipe::Empty => write!(f, "ValuePipe::Empty"),
            ValuePipe::Literal(_) => write!(f, "ValuePipe::Literal(..)"),
            ValuePipe::Computed(pipe) => write!(f, "ValuePipe::Computed({:?})", pipe),
        }
    }
}

/// Single-element source backing a literal lifted into a plan.
struct LiteralSource<T> {
    value: T,
}

impl<T> LiteralSource<T> {
    fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Serialize + Send + Sync> Source for LiteralSource<T> {
    fn name(&self) -> &str {
        "literal"
    }

    fn validate(&self) -> Result<(), SourceFailure> {
        Ok(())
    }

    fn read(&self) -> Result<Vec<Value>, RuntimeError> {
        Ok(vec![record::encode(&self.value)?])
    }
}
