// tests/serial_workflow.rs

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use taskdag::{
    BuildOptions, EventKind, Task, TaskFinish, TaskStart, WorkflowEvent, WorkflowSummary,
};
use taskdag_test_utils::builders::{
    Greeting, all_tasks, bar_task, baz_task, failing, foo_task, simple_builder,
};
use taskdag_test_utils::recorder::EventRecorder;
use taskdag_test_utils::recording_executor::RecordingExecutor;
use taskdag_test_utils::{init_tracing, with_timeout};

fn ids(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn linear_chain_registered_out_of_order_runs_dependencies_first() {
    init_tracing();

    let builder = simple_builder([baz_task(), foo_task(), bar_task()]);
    let workflow = builder.build_serial(BuildOptions::all()).unwrap();
    assert_eq!(workflow.task_order(), ["foo", "bar", "baz"]);

    let recorder = EventRecorder::attach(workflow.emitter());
    let summary = with_timeout(workflow.run(Greeting::world())).await.unwrap();

    assert_eq!(
        recorder.kinds(),
        vec![
            EventKind::WorkflowStart,
            EventKind::TaskStart,
            EventKind::TaskFinish,
            EventKind::TaskStart,
            EventKind::TaskFinish,
            EventKind::TaskStart,
            EventKind::TaskFinish,
            EventKind::WorkflowFinish,
        ]
    );

    let finishes: Vec<(String, Value)> = recorder
        .finishes()
        .into_iter()
        .map(|TaskFinish { id, result }| (id, result))
        .collect();
    assert_eq!(
        finishes,
        vec![
            ("foo".to_string(), json!(r#"{"hello":"world"}"#)),
            ("bar".to_string(), json!(17)),
            ("baz".to_string(), Value::Null),
        ]
    );

    assert_eq!(
        summary,
        WorkflowSummary {
            tasks_finished: ids(&["foo", "bar", "baz"]),
            tasks_errored: vec![],
            tasks_skipped: vec![],
        }
    );
    assert!(summary.is_success());
}

#[tokio::test]
async fn failing_root_skips_the_rest_of_the_chain() {
    init_tracing();

    let builder = simple_builder([failing(&foo_task(), "foo error"), bar_task(), baz_task()]);
    let workflow = builder.build_serial(BuildOptions::all()).unwrap();
    let recorder = EventRecorder::attach(workflow.emitter());

    let summary = with_timeout(workflow.run(Greeting::world())).await.unwrap();

    let throws = recorder.throws();
    assert_eq!(throws.len(), 1);
    assert_eq!(throws[0].id, "foo");
    assert_eq!(throws[0].error.to_string(), "foo error");

    let skips = recorder.skips();
    assert_eq!(skips.len(), 2);
    assert_eq!(skips[0].id, "bar");
    assert_eq!(skips[0].errored_dependencies, ids(&["foo"]));
    assert!(skips[0].skipped_dependencies.is_empty());
    assert_eq!(skips[1].id, "baz");
    assert!(skips[1].errored_dependencies.is_empty());
    assert_eq!(skips[1].skipped_dependencies, ids(&["bar"]));

    // Skipped tasks never start.
    assert_eq!(recorder.ids(EventKind::TaskStart), ids(&["foo"]));

    assert_eq!(
        summary,
        WorkflowSummary {
            tasks_finished: vec![],
            tasks_errored: ids(&["foo"]),
            tasks_skipped: ids(&["bar", "baz"]),
        }
    );
}

#[tokio::test]
async fn selection_pulls_in_transitive_dependencies_only() {
    let builder = simple_builder(all_tasks());
    let workflow = builder
        .build_serial(BuildOptions::select(["bar"]))
        .unwrap();
    assert_eq!(workflow.task_order(), ["foo", "bar"]);

    let recorder = EventRecorder::attach(workflow.emitter());
    let summary = workflow.run(Greeting::world()).await.unwrap();

    assert_eq!(summary.tasks_finished, ids(&["foo", "bar"]));
    assert!(recorder.position(EventKind::TaskStart, "baz").is_none());
}

#[tokio::test]
async fn panicking_body_is_reported_as_task_error() {
    fn explode() -> Value {
        panic!("not an error value")
    }

    let foo = foo_task().with_run(|_| async { Ok(explode()) });
    let workflow = simple_builder([foo, bar_task()])
        .build_serial(BuildOptions::all())
        .unwrap();
    let recorder = EventRecorder::attach(workflow.emitter());

    let summary = workflow.run(Greeting::world()).await.unwrap();

    let throws = recorder.throws();
    assert_eq!(throws.len(), 1);
    let message = throws[0].error.to_string();
    assert!(message.contains("not an error value"), "got {message}");
    assert_eq!(summary.tasks_errored, ids(&["foo"]));
    assert_eq!(summary.tasks_skipped, ids(&["bar"]));
}

#[tokio::test]
async fn workflow_start_and_finish_carry_context_order_and_summary() {
    let workflow = simple_builder(all_tasks())
        .build_serial(BuildOptions::all())
        .unwrap();
    let recorder = EventRecorder::attach(workflow.emitter());

    let summary = workflow.run(Greeting::world()).await.unwrap();

    let events = recorder.events();
    match events.first() {
        Some(WorkflowEvent::WorkflowStart(start)) => {
            assert_eq!(*start.context, Greeting::world());
            assert_eq!(&*start.task_order, workflow.task_order());
        }
        other => panic!("expected workflowStart first, got {other:?}"),
    }
    match events.last() {
        Some(WorkflowEvent::WorkflowFinish(finish)) => assert_eq!(finish, &summary),
        other => panic!("expected workflowFinish last, got {other:?}"),
    }
}

#[tokio::test]
async fn reading_an_undeclared_failed_task_errors_the_reader() {
    // `independent` reads foo's result without depending on it.
    let mut builder = simple_builder([failing(&foo_task(), "foo error")]);
    builder
        .add_task(Task::new("independent", Vec::<String>::new(), |ctx| async move {
            Ok(ctx.task_result("foo")?)
        }))
        .unwrap();
    let workflow = builder.build_serial(BuildOptions::all()).unwrap();
    let recorder = EventRecorder::attach(workflow.emitter());

    let summary = workflow.run(Greeting::world()).await.unwrap();

    assert_eq!(summary.tasks_errored, ids(&["foo", "independent"]));
    let throws = recorder.throws();
    assert_eq!(throws[1].id, "independent");
    let message = throws[1].error.to_string();
    assert!(message.contains("errored"), "got {message}");
    assert!(message.contains("declared as a dependency"), "got {message}");
}

#[tokio::test]
async fn listeners_can_unsubscribe() {
    let workflow = simple_builder(all_tasks())
        .build_serial(BuildOptions::all())
        .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = workflow
        .emitter()
        .on(move |start: &TaskStart| sink.lock().unwrap().push(start.id.clone()));

    workflow.run(Greeting::world()).await.unwrap();
    assert!(workflow.emitter().off(id));
    workflow.run(Greeting::world()).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), ids(&["foo", "bar", "baz"]));
    assert!(!workflow.emitter().off(id));
}

#[tokio::test]
async fn panicking_listener_does_not_disturb_the_run() {
    let workflow = simple_builder(all_tasks())
        .build_serial(BuildOptions::all())
        .unwrap();
    workflow.emitter().on(|_: &TaskStart| panic!("listener bug"));
    let recorder = EventRecorder::attach(workflow.emitter());

    let summary = with_timeout(workflow.run(Greeting::world())).await.unwrap();

    assert!(summary.is_success());
    assert_eq!(recorder.ids(EventKind::TaskFinish), ids(&["foo", "bar", "baz"]));
}

#[tokio::test]
async fn custom_executor_drives_the_runner() {
    let executed = Arc::new(Mutex::new(Vec::new()));
    let workflow = simple_builder(all_tasks())
        .build(RecordingExecutor::new(Arc::clone(&executed)), BuildOptions::all())
        .unwrap();
    assert_eq!(workflow.executor_name(), "recording");

    let summary = workflow.run(Greeting::world()).await.unwrap();

    // Dependents go first here, so they read results that do not exist yet.
    assert_eq!(*executed.lock().unwrap(), ids(&["baz", "bar", "foo"]));
    assert_eq!(summary.tasks_finished, ids(&["foo"]));
    assert_eq!(summary.tasks_errored, ids(&["baz", "bar"]));
}
