//! Owned plan graph data, behind the [`Plan`](super::Plan) handle.

use crate::io::SinkRef;

use super::stage::{NodeId, Stage};

/// A registered stage with its assigned node id.
#[derive(Debug, Clone)]
pub struct PlanNode {
    /// Dense, registration-ordered id.
    pub id: NodeId,
    /// The stage itself.
    pub stage: Stage,
}

/// A sink draining one node's records.
#[derive(Debug, Clone)]
pub struct SinkNode {
    /// Node whose output this sink receives.
    pub node: NodeId,
    /// The sink adapter.
    pub sink: SinkRef,
}

/// The full, append-only graph of a plan under construction.
#[derive(Debug, Clone, Default)]
pub struct PlanGraph {
    /// Optional plan name, usually the application name.
    pub name: Option<String>,
    /// Stages in registration (and therefore topological) order.
    pub nodes: Vec<PlanNode>,
    /// Sinks in registration order.
    pub sinks: Vec<SinkNode>,
}

impl PlanGraph {
    /// Create an empty graph.
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            nodes: Vec::new(),
            sinks: Vec::new(),
        }
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&PlanNode> {
        self.nodes.get(id as usize)
    }
}
