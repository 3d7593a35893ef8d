//! Transform stages registered into a plan graph.

use std::sync::Arc;

use crate::error::RuntimeError;
use crate::io::SourceRef;
use crate::types::Value;

/// Plan-local node identifier, dense and increasing in registration order.
pub type NodeId = u64;

/// Erased one-to-one record transform.
pub type MapFn = Arc<dyn Fn(Value) -> Result<Value, RuntimeError> + Send + Sync>;

/// Erased one-to-many record transform.
pub type FlatMapFn = Arc<dyn Fn(Value) -> Result<Vec<Value>, RuntimeError> + Send + Sync>;

/// Erased record predicate.
pub type FilterFn = Arc<dyn Fn(&Value) -> Result<bool, RuntimeError> + Send + Sync>;

/// One stage of a plan.
///
/// A closed set: the engine matches exhaustively, so adding a stage kind is
/// a cross-crate change by design.
#[derive(Clone)]
pub enum Stage {
    /// Read records from an external source.
    Source(SourceRef),
    /// One-to-one transform of the input node's records.
    Map {
        /// Upstream node.
        input: NodeId,
        /// Record transform.
        f: MapFn,
    },
    /// One-to-many transform of the input node's records.
    FlatMap {
        /// Upstream node.
        input: NodeId,
        /// Record transform.
        f: FlatMapFn,
    },
    /// Keep only records matching the predicate.
    Filter {
        /// Upstream node.
        input: NodeId,
        /// Record predicate.
        predicate: FilterFn,
    },
    /// Drop duplicate records by identity.
    Distinct {
        /// Upstream node.
        input: NodeId,
    },
    /// Pairwise left cross-combination of two nodes.
    ///
    /// Emits `(l, Some(r))` for every right record, or `(l, None)` when the
    /// right side is empty.
    LeftCross {
        /// Left upstream node; every record is preserved.
        left: NodeId,
        /// Right upstream node.
        right: NodeId,
    },
}

impl Stage {
    /// Upstream nodes this stage reads from.
    pub fn inputs(&self) -> Vec<NodeId> {
        match self {
            Stage::Source(_) => vec![],
            Stage::Map { input, .. }
            | Stage::FlatMap { input, .. }
            | Stage::Filter { input, .. }
            | Stage::Distinct { input } => vec![*input],
            Stage::LeftCross { left, right } => vec![*left, *right],
        }
    }

    /// Short stage kind tag for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Stage::Source(_) => "source",
            Stage::Map { .. } => "map",
            Stage::FlatMap { .. } => "flat_map",
            Stage::Filter { .. } => "filter",
            Stage::Distinct { .. } => "distinct",
            Stage::LeftCross { .. } => "left_cross",
        }
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Source(s) => write!(f, "Source({})", s.name()),
            other => write!(f, "{}{:?}", other.kind(), other.inputs()),
        }
    }
}
