//! The local runtime and its plan connector.

use std::sync::Arc;

use sluice_core::error::CompileError;
use sluice_core::runtime::{PlanConnector, Runtime, SubmittedPlan};
use sluice_core::types::{Config, Plan};

use crate::submitted::LocalSubmittedPlan;
use crate::validate::validate_graph;

/// Local runtime configuration.
#[derive(Debug, Clone)]
pub struct LocalRuntimeConfig {
    /// Initialize a `tracing` fmt subscriber on construction (default: true).
    pub enable_tracing: bool,
    /// Name prefix for plan worker threads.
    pub worker_name: String,
}

impl Default for LocalRuntimeConfig {
    fn default() -> Self {
        Self {
            enable_tracing: true,
            worker_name: "sluice-worker".to_string(),
        }
    }
}

impl LocalRuntimeConfig {
    /// Configuration for tests: no subscriber installation.
    pub fn in_memory() -> Self {
        Self {
            enable_tracing: false,
            ..Self::default()
        }
    }
}

/// In-process execution engine.
///
/// One instance can accept any number of plans; each submission executes
/// on its own worker thread.
pub struct LocalRuntime {
    config: LocalRuntimeConfig,
}

impl LocalRuntime {
    /// Create a runtime with the given configuration.
    pub fn new(config: LocalRuntimeConfig) -> Self {
        if config.enable_tracing {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_level(true)
                .try_init()
                .ok(); // Ignore if already initialized
        }
        Self { config }
    }

    /// The runtime configuration.
    pub fn config(&self) -> &LocalRuntimeConfig {
        &self.config
    }
}

impl Default for LocalRuntime {
    fn default() -> Self {
        Self::new(LocalRuntimeConfig::default())
    }
}

impl Runtime for LocalRuntime {
    fn connector(&self, config: &Config) -> Box<dyn PlanConnector> {
        Box::new(LocalPlanConnector {
            config: config.clone(),
            worker_name: self.config.worker_name.clone(),
        })
    }
}

/// Connector translating plans into local submitted-plan handles.
struct LocalPlanConnector {
    config: Config,
    worker_name: String,
}

impl PlanConnector for LocalPlanConnector {
    fn connect(&self, plan: &Plan) -> Result<Arc<dyn SubmittedPlan>, CompileError> {
        let graph = plan.snapshot();
        validate_graph(&graph)?;

        tracing::debug!(
            plan = %plan.id(),
            stages = graph.nodes.len(),
            sinks = graph.sinks.len(),
            "plan accepted"
        );

        Ok(Arc::new(LocalSubmittedPlan::new(
            graph,
            self.config.clone(),
            self.worker_name.clone(),
        )))
    }
}
