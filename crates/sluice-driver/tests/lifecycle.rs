//! Driver lifecycle against the real local engine.

use std::sync::Arc;

use parking_lot::Mutex;

use sluice_core::error::{RuntimeError, SourceFailure};
use sluice_core::io::{Sink, Source};
use sluice_core::runtime::Runtime;
use sluice_core::types::{Config, Stage, Value};

use sluice_driver::{ExecError, Execution, ExecutionContext};
use sluice_runtime::{LocalRuntime, LocalRuntimeConfig};

struct Words(Vec<&'static str>);

impl Source for Words {
    fn name(&self) -> &str {
        "words"
    }
    fn validate(&self) -> Result<(), SourceFailure> {
        Ok(())
    }
    fn read(&self) -> Result<Vec<Value>, RuntimeError> {
        Ok(self
            .0
            .iter()
            .map(|w| Value::String(w.to_string()))
            .collect())
    }
}

struct Capture(Arc<Mutex<Vec<Value>>>);

impl Sink for Capture {
    fn name(&self) -> &str {
        "capture"
    }
    fn write(&self, records: &[Value]) -> Result<(), RuntimeError> {
        *self.0.lock() = records.to_vec();
        Ok(())
    }
}

fn local_runtime() -> Arc<dyn Runtime> {
    Arc::new(LocalRuntime::new(LocalRuntimeConfig::in_memory()))
}

fn register_distinct_words(
    context: &ExecutionContext,
    cell: &Arc<Mutex<Vec<Value>>>,
) -> Result<(), ExecError> {
    let plan = context.plan();
    let source = plan.add_source(Arc::new(Words(vec!["b", "a", "b"])));
    let distinct = plan.add_stage(Stage::Distinct { input: source });
    plan.add_sink(distinct, Arc::new(Capture(Arc::clone(cell))));
    Ok(())
}

#[test]
fn test_wait_for_runs_to_completion_and_cleans_up() {
    let execution = Execution::default();
    let runtime = local_runtime();
    let conf = Config::new().with_app_name("distinct-words");

    let cell = Arc::new(Mutex::new(Vec::new()));
    let (user, stats) =
        execution.wait_for(&conf, &runtime, |ctx| register_distinct_words(ctx, &cell));

    user.unwrap();
    let stats = stats.unwrap();
    assert!(stats.is_clean());
    assert_eq!(stats.records_read, 3);
    assert_eq!(stats.records_written, 2);
    assert!(stats.submission_id.is_some());

    assert_eq!(cell.lock().len(), 2);
    assert!(execution.plan_state().is_empty());
}

#[tokio::test]
async fn test_run_resolves_asynchronously() {
    let execution = Execution::default();
    let runtime = local_runtime();

    let cell = Arc::new(Mutex::new(Vec::new()));
    let (user, future) = execution.run(&Config::new(), &runtime, |ctx| {
        register_distinct_words(ctx, &cell)
    });

    user.unwrap();
    let stats = future.await.unwrap();
    assert_eq!(stats.records_written, 2);
    assert!(execution.plan_state().is_empty());
}

#[test]
fn test_sinkless_plan_fails_compilation_without_submitting() {
    let execution = Execution::default();
    let runtime = local_runtime();

    let (user, stats) = execution.wait_for(&Config::new(), &runtime, |ctx| {
        ctx.plan().add_source(Arc::new(Words(vec!["a"])));
        Ok(())
    });

    user.unwrap();
    assert!(matches!(stats, Err(ExecError::Compile(_))));
    assert!(execution.plan_state().is_empty());
}

#[test]
fn test_source_validation_failure_surfaces_as_aggregate() {
    struct MissingInput;

    impl Source for MissingInput {
        fn name(&self) -> &str {
            "missing-input"
        }
        fn validate(&self) -> Result<(), SourceFailure> {
            Err(SourceFailure {
                name: "missing-input".to_string(),
                message: "required input does not exist".to_string(),
            })
        }
        fn read(&self) -> Result<Vec<Value>, RuntimeError> {
            Ok(vec![])
        }
    }

    let execution = Execution::default();
    let runtime = local_runtime();

    let (user, stats) = execution.wait_for(&Config::new(), &runtime, |ctx| {
        let node = ctx.plan().add_source(Arc::new(MissingInput));
        ctx.plan()
            .add_sink(node, Arc::new(Capture(Arc::new(Mutex::new(Vec::new())))));
        Execution::validate_sources(ctx)
    });

    assert!(matches!(user, Err(ExecError::SourceValidation(_))));
    assert!(matches!(stats, Err(ExecError::SourceValidation(_))));
    assert!(execution.plan_state().is_empty());
}
