// tests/staged_executor.rs

mod common;

use std::num::NonZeroUsize;

use taskdag::{BuildOptions, EventKind, StagedExecutor, Task, WorkflowBuilder};
use taskdag_test_utils::builders::{
    Greeting, all_tasks, bar_task, baz_task, failing, foo_task, simple_builder,
};
use taskdag_test_utils::recorder::EventRecorder;
use taskdag_test_utils::{init_tracing, with_timeout};

use crate::common::{InFlight, sleepy_task};

fn builder(tasks: Vec<Task<(), u64>>) -> WorkflowBuilder<(), u64> {
    let mut builder = WorkflowBuilder::new();
    for task in tasks {
        builder.add_task(task).unwrap();
    }
    builder
}

/// `quick -> after_quick`, plus an unrelated `slow` root.
fn uneven_roots() -> WorkflowBuilder<(), u64> {
    builder(vec![
        sleepy_task("quick", &[], 5),
        sleepy_task("slow", &[], 60),
        sleepy_task("after_quick", &["quick"], 1),
    ])
}

#[tokio::test]
async fn next_stage_waits_for_the_whole_previous_stage() {
    init_tracing();

    let workflow = uneven_roots()
        .build_staged(None, BuildOptions::all())
        .unwrap();
    assert_eq!(workflow.executor_name(), "staged");
    let recorder = EventRecorder::attach(workflow.emitter());

    let summary = with_timeout(workflow.run(())).await.unwrap();
    assert!(summary.is_success());

    let slow_done = recorder.terminal_position("slow").unwrap();
    let after_started = recorder.position(EventKind::TaskStart, "after_quick").unwrap();
    assert!(slow_done < after_started);
}

#[tokio::test]
async fn concurrent_executor_does_not_wait_for_unrelated_tasks() {
    let workflow = uneven_roots()
        .build_concurrent(None, BuildOptions::all())
        .unwrap();
    let recorder = EventRecorder::attach(workflow.emitter());

    with_timeout(workflow.run(())).await.unwrap();

    let slow_done = recorder.terminal_position("slow").unwrap();
    let after_started = recorder.position(EventKind::TaskStart, "after_quick").unwrap();
    assert!(after_started < slow_done);
}

#[tokio::test]
async fn stage_members_overlap_up_to_the_limit() {
    let in_flight = InFlight::default();
    let workflow = builder(vec![
        in_flight.task("a", &[], 20),
        in_flight.task("b", &[], 20),
        in_flight.task("c", &[], 20),
        in_flight.task("d", &["a", "b", "c"], 1),
    ])
    .build(StagedExecutor::with_limit(NonZeroUsize::new(2).unwrap()), BuildOptions::all())
    .unwrap();

    let summary = with_timeout(workflow.run(())).await.unwrap();

    assert_eq!(in_flight.peak(), 2);
    assert_eq!(summary.tasks_finished.last().map(String::as_str), Some("d"));
}

#[tokio::test]
async fn chain_runs_one_task_per_stage() {
    let workflow = simple_builder(all_tasks())
        .build_staged(None, BuildOptions::all())
        .unwrap();
    let recorder = EventRecorder::attach(workflow.emitter());

    let summary = with_timeout(workflow.run(Greeting::world())).await.unwrap();

    assert_eq!(summary.tasks_finished, vec!["foo", "bar", "baz"]);
    assert_eq!(recorder.ids(EventKind::TaskFinish), vec!["foo", "bar", "baz"]);
}

#[tokio::test]
async fn failure_cascades_across_stages() {
    let workflow = simple_builder([failing(&foo_task(), "foo error"), bar_task(), baz_task()])
        .build_staged(NonZeroUsize::new(1), BuildOptions::all())
        .unwrap();
    let recorder = EventRecorder::attach(workflow.emitter());

    let summary = with_timeout(workflow.run(Greeting::world())).await.unwrap();

    assert!(summary.tasks_finished.is_empty());
    assert_eq!(summary.tasks_errored, vec!["foo"]);
    assert_eq!(summary.tasks_skipped, vec!["bar", "baz"]);

    let skips = recorder.skips();
    assert_eq!(skips[0].id, "bar");
    assert_eq!(skips[0].errored_dependencies, vec!["foo"]);
    assert!(skips[0].skipped_dependencies.is_empty());
    assert_eq!(skips[1].id, "baz");
    assert!(skips[1].errored_dependencies.is_empty());
    assert_eq!(skips[1].skipped_dependencies, vec!["bar"]);
}
