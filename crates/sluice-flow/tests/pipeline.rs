//! End-to-end pipelines through the typed layer, driver, and local engine.

use std::collections::HashSet;
use std::sync::Arc;

use sluice_core::runtime::Runtime;
use sluice_core::types::Config;

use sluice_driver::{ExecError, Execution};
use sluice_flow::{MemorySink, TextLineSource, TypedPipe, ValuePipe};
use sluice_runtime::{LocalRuntime, LocalRuntimeConfig};

fn local_runtime() -> Arc<dyn Runtime> {
    Arc::new(LocalRuntime::new(LocalRuntimeConfig::in_memory()))
}

#[test]
fn test_tokenize_lowercase_distinct() {
    let execution = Execution::default();
    let runtime = local_runtime();
    let conf = Config::new().with_app_name("wordset");

    let sink = Arc::new(MemorySink::new("words"));
    let sink_in = Arc::clone(&sink);

    let (user, stats) = execution.wait_for(&conf, &runtime, move |ctx| {
        let lines = TypedPipe::from_iter(
            ctx.plan(),
            "lines",
            vec!["hello World".to_string(), "goodbye world".to_string()],
        )?;
        lines
            .flat_map(|line: String| {
                line.split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .map(|word: String| word.to_lowercase())
            .distinct()
            .write(sink_in);
        Ok(())
    });

    user.unwrap();
    let stats = stats.unwrap();
    assert!(stats.is_clean());

    let words: HashSet<String> = sink.typed_records().unwrap().into_iter().collect();
    let expected: HashSet<String> = ["hello", "world", "goodbye"]
        .iter()
        .map(|w| w.to_string())
        .collect();
    assert_eq!(words, expected);
}

#[tokio::test]
async fn test_async_run_of_a_filtered_pipeline() {
    let execution = Execution::default();
    let runtime = local_runtime();

    let sink = Arc::new(MemorySink::new("evens"));
    let sink_in = Arc::clone(&sink);

    let (user, future) = execution.run(&Config::new(), &runtime, move |ctx| {
        let numbers = TypedPipe::from_iter(ctx.plan(), "numbers", 1u64..=10)?;
        numbers.filter(|n| *n % 2 == 0).write(sink_in);
        Ok(())
    });

    user.unwrap();
    let stats = future.await.unwrap();
    assert_eq!(stats.records_written, 5);
    assert_eq!(sink.typed_records::<u64>().unwrap(), vec![2, 4, 6, 8, 10]);
}

#[test]
fn test_left_cross_pairs_every_left_record() {
    let execution = Execution::default();
    let runtime = local_runtime();

    let sink = Arc::new(MemorySink::new("pairs"));
    let sink_in = Arc::clone(&sink);

    let (user, stats) = execution.wait_for(&Config::new(), &runtime, move |ctx| {
        let left = TypedPipe::from_iter(
            ctx.plan(),
            "left",
            vec!["a".to_string(), "b".to_string()],
        )?;
        let right = TypedPipe::from_iter(ctx.plan(), "right", vec![7u64])?;
        left.left_cross(right).write(sink_in);
        Ok(())
    });

    user.unwrap();
    stats.unwrap();

    let pairs: Vec<(String, Option<u64>)> = sink.typed_records().unwrap();
    assert_eq!(
        pairs,
        vec![("a".to_string(), Some(7)), ("b".to_string(), Some(7))]
    );
}

#[test]
fn test_literal_crossed_with_computed_resolves_through_execution() {
    let conf = Config::new();
    let runtime = local_runtime();

    let plan = sluice_core::types::Plan::new(None);
    let right = TypedPipe::from_iter(&plan, "right", vec![3u64]).unwrap();

    let crossed = ValuePipe::Literal("x".to_string()).left_cross(ValuePipe::Computed(right));
    let resolved = crossed.to_option(&conf, runtime).unwrap();
    assert_eq!(resolved, Some(("x".to_string(), Some(3))));
}

#[test]
fn test_missing_text_input_fails_validation_before_running() {
    let execution = Execution::default();
    let runtime = local_runtime();

    let sink = Arc::new(MemorySink::new("lines"));
    let sink_in = Arc::clone(&sink);

    let (user, stats) = execution.wait_for(&Config::new(), &runtime, move |ctx| {
        let lines: TypedPipe<String> = TypedPipe::from_source(
            ctx.plan(),
            Arc::new(TextLineSource::new("/no/such/input.txt")),
        );
        lines.write(sink_in);
        Execution::validate_sources(ctx)
    });

    assert!(matches!(user, Err(ExecError::SourceValidation(_))));
    assert!(matches!(stats, Err(ExecError::SourceValidation(_))));
    assert!(sink.records().is_empty());
}

#[test]
fn test_text_round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    let output = dir.path().join("output.txt");
    std::fs::write(&input, "one\ntwo\ntwo\n").unwrap();

    let execution = Execution::default();
    let runtime = local_runtime();

    let out_sink = Arc::new(sluice_flow::TextLineSink::new(&output));
    let (user, stats) = execution.wait_for(&Config::new(), &runtime, move |ctx| {
        let lines: TypedPipe<String> =
            TypedPipe::from_source(ctx.plan(), Arc::new(TextLineSource::new(&input)));
        lines.distinct().write(out_sink);
        Ok(())
    });

    user.unwrap();
    stats.unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written, "one\ntwo\n");
}
