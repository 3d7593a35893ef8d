//! Core data types shared across the workspace.

mod config;
mod stats;

pub mod plan;
pub mod record;

pub use config::Config;
pub use plan::{NodeId, Plan, PlanGraph, PlanId, PlanNode, SinkNode, Stage};
pub use record::Value;
pub use stats::Statistics;
