//! Typed pipes: the combinator handle onto a plan node.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use sluice_core::error::RuntimeError;
use sluice_core::io::{SinkRef, SourceRef};
use sluice_core::types::plan::Stage;
use sluice_core::types::{record, NodeId, Plan, Value};

use crate::adapters::MemorySource;

/// A typed handle onto one node of a plan under construction.
///
/// Combinators mutate the plan (registering a new stage) and return a new
/// handle; the pipe itself carries no data. The type parameter is erased at
/// the plan boundary: user closures are wrapped into record functions over
/// the engine representation.
pub struct TypedPipe<T> {
    plan: Plan,
    node: NodeId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for TypedPipe<T> {
    fn clone(&self) -> Self {
        Self {
            plan: self.plan.clone(),
            node: self.node,
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for TypedPipe<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedPipe")
            .field("plan", &self.plan.id())
            .field("node", &self.node)
            .finish()
    }
}

impl<T> TypedPipe<T> {
    /// Wrap an existing plan node. The caller asserts the node's records
    /// decode as `T`.
    pub fn from_node(plan: Plan, node: NodeId) -> Self {
        Self {
            plan,
            node,
            _marker: PhantomData,
        }
    }

    /// The plan this pipe is registered in.
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// The node this pipe reads from.
    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl<T> TypedPipe<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Create a pipe over a registered source adapter.
    pub fn from_source(plan: &Plan, source: SourceRef) -> Self {
        let node = plan.add_source(source);
        Self::from_node(plan.clone(), node)
    }

    /// Create a pipe over an in-memory collection.
    pub fn from_iter<I>(plan: &Plan, name: &str, items: I) -> Result<Self, RuntimeError>
    where
        I: IntoIterator<Item = T>,
    {
        let source = MemorySource::from_iter(name, items)?;
        Ok(Self::from_source(plan, Arc::new(source)))
    }

    /// One-to-one transform.
    pub fn map<U, F>(self, f: F) -> TypedPipe<U>
    where
        U: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let erased = move |value: Value| -> Result<Value, RuntimeError> {
            let input: T = record::decode(value)?;
            record::encode(&f(input))
        };
        let node = self.plan.add_stage(Stage::Map {
            input: self.node,
            f: Arc::new(erased),
        });
        TypedPipe::from_node(self.plan, node)
    }

    /// One-to-many transform.
    pub fn flat_map<U, I, F>(self, f: F) -> TypedPipe<U>
    where
        U: Serialize + DeserializeOwned + Send + Sync + 'static,
        I: IntoIterator<Item = U>,
        F: Fn(T) -> I + Send + Sync + 'static,
    {
        let erased = move |value: Value| -> Result<Vec<Value>, RuntimeError> {
            let input: T = record::decode(value)?;
            f(input).into_iter().map(|u| record::encode(&u)).collect()
        };
        let node = self.plan.add_stage(Stage::FlatMap {
            input: self.node,
            f: Arc::new(erased),
        });
        TypedPipe::from_node(self.plan, node)
    }

    /// Keep only records matching the predicate.
    pub fn filter<F>(self, predicate: F) -> TypedPipe<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let erased = move |value: &Value| -> Result<bool, RuntimeError> {
            let input: T = record::decode(value.clone())?;
            Ok(predicate(&input))
        };
        let node = self.plan.add_stage(Stage::Filter {
            input: self.node,
            predicate: Arc::new(erased),
        });
        TypedPipe::from_node(self.plan, node)
    }

    /// Drop duplicate records by identity.
    pub fn distinct(self) -> TypedPipe<T> {
        let node = self.plan.add_stage(Stage::Distinct { input: self.node });
        TypedPipe::from_node(self.plan, node)
    }

    /// Pairwise left cross-combination with another pipe of the same plan.
    ///
    /// Every left record is preserved: paired with `Some(u)` for each right
    /// record, or with `None` when the right side turns out to be empty.
    ///
    /// # Panics
    ///
    /// Panics when the operands belong to different plans; pipes are only
    /// combinable within the execution context that built them.
    pub fn left_cross<U>(self, right: TypedPipe<U>) -> TypedPipe<(T, Option<U>)>
    where
        U: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        assert_eq!(
            self.plan.id(),
            right.plan.id(),
            "cannot combine pipes from different plans"
        );
        let node = self.plan.add_stage(Stage::LeftCross {
            left: self.node,
            right: right.node,
        });
        TypedPipe::from_node(self.plan, node)
    }

    /// Drain this pipe into a sink.
    pub fn write(self, sink: SinkRef) {
        self.plan.add_sink(self.node, sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemorySink;

    fn plan() -> Plan {
        Plan::new(Some("typed-pipe-test".to_string()))
    }

    #[test]
    fn test_combinators_register_stages_without_reading() {
        let plan = plan();
        let pipe = TypedPipe::from_iter(&plan, "numbers", vec![1u64, 2, 3]).unwrap();

        let sink = Arc::new(MemorySink::new("out"));
        pipe.map(|n| n * 2)
            .filter(|n| *n > 2)
            .distinct()
            .write(sink);

        // source + map + filter + distinct registered, nothing executed
        assert_eq!(plan.stage_count(), 4);
    }

    #[test]
    fn test_left_cross_registers_binary_stage() {
        let plan = plan();
        let left = TypedPipe::from_iter(&plan, "left", vec!["a".to_string()]).unwrap();
        let right = TypedPipe::from_iter(&plan, "right", vec![1u64]).unwrap();

        let crossed = left.left_cross(right);
        assert_eq!(crossed.node(), 2);
    }

    #[test]
    #[should_panic(expected = "different plans")]
    fn test_left_cross_rejects_foreign_plan() {
        let left = TypedPipe::from_iter(&plan(), "left", vec!["a".to_string()]).unwrap();
        let right = TypedPipe::from_iter(&plan(), "right", vec![1u64]).unwrap();
        let _ = left.left_cross(right);
    }
}
