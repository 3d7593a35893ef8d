//! Sequential graph executor.
//!
//! Stages are evaluated in node-id order, which is topological by
//! construction, with per-node outputs memoized until the run finishes.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use sluice_core::error::RuntimeError;
use sluice_core::runtime::PlanOutcome;
use sluice_core::types::{record, Config, NodeId, PlanGraph, PlanNode, Stage, Statistics, Value};

pub(crate) fn execute_graph(
    graph: PlanGraph,
    config: &Config,
    stop: &AtomicBool,
) -> (PlanOutcome, Statistics) {
    let start = Instant::now();
    let mut stats = Statistics {
        submission_id: config.unique_id().map(str::to_string),
        ..Statistics::default()
    };
    let name = graph.name.as_deref().unwrap_or("<unnamed>").to_string();

    tracing::info!(plan = %name, stages = graph.nodes.len(), "executing plan");

    let mut outputs: Vec<Option<Vec<Value>>> = vec![None; graph.nodes.len()];

    for node in &graph.nodes {
        if stop.load(Ordering::SeqCst) {
            stats.duration_ms = start.elapsed().as_millis();
            tracing::info!(plan = %name, "plan stopped");
            return (PlanOutcome::Stopped, stats);
        }

        match eval_stage(node, &outputs) {
            Ok(records) => {
                stats.executed_stages += 1;
                if matches!(node.stage, Stage::Source(_)) {
                    stats.records_read += records.len();
                }
                outputs[node.id as usize] = Some(records);
            }
            Err(cause) => {
                stats.failed_stages += 1;
                stats.duration_ms = start.elapsed().as_millis();
                tracing::warn!(plan = %name, stage = node.id, error = %cause, "stage failed");
                return (PlanOutcome::Failed(cause), stats);
            }
        }
    }

    for sink_node in &graph.sinks {
        if stop.load(Ordering::SeqCst) {
            stats.duration_ms = start.elapsed().as_millis();
            tracing::info!(plan = %name, "plan stopped");
            return (PlanOutcome::Stopped, stats);
        }

        let records = match upstream(&outputs, sink_node.node, None) {
            Ok(records) => records,
            Err(cause) => {
                stats.duration_ms = start.elapsed().as_millis();
                return (PlanOutcome::Failed(cause), stats);
            }
        };

        if let Err(cause) = sink_node.sink.write(records) {
            stats.duration_ms = start.elapsed().as_millis();
            tracing::warn!(plan = %name, sink = sink_node.sink.name(), error = %cause, "sink failed");
            return (PlanOutcome::Failed(cause), stats);
        }
        stats.records_written += records.len();
    }

    stats.duration_ms = start.elapsed().as_millis();
    tracing::info!(
        plan = %name,
        stages = stats.executed_stages,
        records_written = stats.records_written,
        duration_ms = stats.duration_ms as u64,
        "plan completed"
    );
    (PlanOutcome::Completed, stats)
}

fn eval_stage(
    node: &PlanNode,
    outputs: &[Option<Vec<Value>>],
) -> Result<Vec<Value>, RuntimeError> {
    let stage_err = |e: RuntimeError| RuntimeError::Stage {
        node: node.id,
        message: e.to_string(),
    };

    match &node.stage {
        Stage::Source(source) => source.read(),

        Stage::Map { input, f } => upstream(outputs, *input, Some(node.id))?
            .iter()
            .map(|v| f(v.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(stage_err),

        Stage::FlatMap { input, f } => {
            let mut out = Vec::new();
            for value in upstream(outputs, *input, Some(node.id))? {
                out.extend(f(value.clone()).map_err(stage_err)?);
            }
            Ok(out)
        }

        Stage::Filter { input, predicate } => {
            let mut out = Vec::new();
            for value in upstream(outputs, *input, Some(node.id))? {
                if predicate(value).map_err(stage_err)? {
                    out.push(value.clone());
                }
            }
            Ok(out)
        }

        Stage::Distinct { input } => {
            let mut seen = HashSet::new();
            let mut out = Vec::new();
            for value in upstream(outputs, *input, Some(node.id))? {
                if seen.insert(record::identity_key(value)) {
                    out.push(value.clone());
                }
            }
            Ok(out)
        }

        Stage::LeftCross { left, right } => {
            let left_records = upstream(outputs, *left, Some(node.id))?;
            let right_records = upstream(outputs, *right, Some(node.id))?;
            let mut out = Vec::new();
            for l in left_records {
                if right_records.is_empty() {
                    out.push(Value::Array(vec![l.clone(), Value::Null]));
                } else {
                    for r in right_records {
                        out.push(Value::Array(vec![l.clone(), r.clone()]));
                    }
                }
            }
            Ok(out)
        }
    }
}

fn upstream<'a>(
    outputs: &'a [Option<Vec<Value>>],
    id: NodeId,
    reader: Option<NodeId>,
) -> Result<&'a [Value], RuntimeError> {
    outputs
        .get(id as usize)
        .and_then(Option::as_ref)
        .map(Vec::as_slice)
        .ok_or_else(|| match reader {
            Some(reader) => RuntimeError::State(format!(
                "stage {reader} read missing output of node {id}"
            )),
            None => RuntimeError::State(format!("sink drains missing output of node {id}")),
        })
}
