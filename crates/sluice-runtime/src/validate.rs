use sluice_core::error::CompileError;
use sluice_core::types::{PlanGraph, Stage};

pub fn validate_graph(graph: &PlanGraph) -> Result<(), CompileError> {
    if graph.nodes.is_empty() {
        return Err(CompileError::Validation(
            "plan contains no stages".to_string(),
        ));
    }

    for node in &graph.nodes {
        for input in node.stage.inputs() {
            if input >= node.id {
                return Err(CompileError::Validation(format!(
                    "stage {} ({}) references node {} which is not upstream",
                    node.id,
                    node.stage.kind(),
                    input
                )));
            }
        }

        if let Stage::LeftCross { left, right } = &node.stage {
            if left == right {
                return Err(CompileError::Translation(format!(
                    "stage {} crosses node {} with itself",
                    node.id, left
                )));
            }
        }
    }

    if graph.sinks.is_empty() {
        return Err(CompileError::Translation(
            "plan has no sinks; nothing to execute".to_string(),
        ));
    }

    for sink in &graph.sinks {
        if graph.node(sink.node).is_none() {
            return Err(CompileError::Validation(format!(
                "sink '{}' drains unknown node {}",
                sink.sink.name(),
                sink.node
            )));
        }
    }

    Ok(())
}
