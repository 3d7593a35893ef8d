//! The plan graph: a mutable description of a batch computation.
//!
//! A [`Plan`] is built imperatively by combinator code while an execution
//! context is live, then treated as frozen once a runtime has accepted it.
//! The handle is cheap to clone; every clone refers to the same underlying
//! graph and shares its identity.

mod graph;
mod stage;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

pub use graph::{PlanGraph, PlanNode, SinkNode};
pub use stage::{FilterFn, FlatMapFn, MapFn, NodeId, Stage};

use crate::io::{SinkRef, SourceRef};

static NEXT_PLAN_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one plan instance.
///
/// Registry bookkeeping is keyed by this value, so two plans built from
/// identical descriptions still never share state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlanId(u64);

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "plan-{}", self.0)
    }
}

/// Shared handle to a plan under construction.
#[derive(Clone)]
pub struct Plan {
    id: PlanId,
    graph: Arc<Mutex<PlanGraph>>,
}

impl Plan {
    /// Create a fresh, empty plan.
    pub fn new(name: Option<String>) -> Self {
        let id = PlanId(NEXT_PLAN_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            id,
            graph: Arc::new(Mutex::new(PlanGraph::new(name))),
        }
    }

    /// This plan's process-unique identity.
    pub fn id(&self) -> PlanId {
        self.id
    }

    /// The plan name, usually the configuration's application name.
    pub fn name(&self) -> Option<String> {
        self.graph.lock().name.clone()
    }

    /// Register a stage and return the node id it was assigned.
    ///
    /// Node ids are dense and increase in registration order, which is
    /// also a valid topological order because a stage may only reference
    /// nodes that already exist.
    pub fn add_stage(&self, stage: Stage) -> NodeId {
        let mut graph = self.graph.lock();
        let id = graph.nodes.len() as NodeId;
        graph.nodes.push(PlanNode { id, stage });
        id
    }

    /// Register a source stage.
    pub fn add_source(&self, source: SourceRef) -> NodeId {
        self.add_stage(Stage::Source(source))
    }

    /// Attach a sink draining the given node.
    pub fn add_sink(&self, node: NodeId, sink: SinkRef) {
        self.graph.lock().sinks.push(SinkNode { node, sink });
    }

    /// Every source registered so far, in registration order.
    pub fn sources(&self) -> Vec<SourceRef> {
        self.graph
            .lock()
            .nodes
            .iter()
            .filter_map(|n| match &n.stage {
                Stage::Source(s) => Some(Arc::clone(s)),
                _ => None,
            })
            .collect()
    }

    /// Number of registered stages.
    pub fn stage_count(&self) -> usize {
        self.graph.lock().nodes.len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        let graph = self.graph.lock();
        graph.nodes.is_empty() && graph.sinks.is_empty()
    }

    /// Clone the graph for compilation.
    ///
    /// The engine works from this snapshot; the live handle is considered
    /// frozen once a connector has accepted it.
    pub fn snapshot(&self) -> PlanGraph {
        self.graph.lock().clone()
    }
}

impl std::fmt::Debug for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let graph = self.graph.lock();
        f.debug_struct("Plan")
            .field("id", &self.id)
            .field("name", &graph.name)
            .field("stages", &graph.nodes.len())
            .field("sinks", &graph.sinks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RuntimeError, SourceFailure};
    use crate::io::{Sink, Source};
    use crate::types::Value;

    struct NullSource;

    impl Source for NullSource {
        fn name(&self) -> &str {
            "null"
        }
        fn validate(&self) -> Result<(), SourceFailure> {
            Ok(())
        }
        fn read(&self) -> Result<Vec<Value>, RuntimeError> {
            Ok(vec![])
        }
    }

    struct NullSink;

    impl Sink for NullSink {
        fn name(&self) -> &str {
            "null"
        }
        fn write(&self, _records: &[Value]) -> Result<(), RuntimeError> {
            Ok(())
        }
    }

    #[test]
    fn test_plan_ids_are_unique() {
        let a = Plan::new(None);
        let b = Plan::new(None);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_clones_share_identity_and_graph() {
        let plan = Plan::new(Some("shared".to_string()));
        let alias = plan.clone();

        let node = plan.add_source(Arc::new(NullSource));
        alias.add_sink(node, Arc::new(NullSink));

        assert_eq!(plan.id(), alias.id());
        assert_eq!(plan.stage_count(), 1);
        assert!(!alias.is_empty());
    }

    #[test]
    fn test_node_ids_are_dense() {
        let plan = Plan::new(None);
        let a = plan.add_source(Arc::new(NullSource));
        let b = plan.add_stage(Stage::Distinct { input: a });
        assert_eq!((a, b), (0, 1));
    }
}
