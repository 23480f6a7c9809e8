#![allow(dead_code)]

//! The three-task `foo -> bar -> baz` workflow most tests are written against.
//!
//! - `foo` returns the JSON encoding of the context
//! - `bar` depends on `foo` and returns the length of that string
//! - `baz` depends on `bar`, reads it, and returns nothing (`null`)

use anyhow::anyhow;
use serde::Serialize;
use serde_json::Value;
use taskdag::{Task, WorkflowBuilder};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Greeting {
    pub hello: String,
}

impl Greeting {
    pub fn world() -> Self {
        Self {
            hello: "world".to_string(),
        }
    }
}

pub type SimpleTask = Task<Greeting, Value>;
pub type SimpleBuilder = WorkflowBuilder<Greeting, Value>;

pub const NO_DEPS: [&str; 0] = [];

pub fn foo_task() -> SimpleTask {
    Task::new("foo", NO_DEPS, |ctx| async move {
        Ok(Value::String(serde_json::to_string(ctx.context())?))
    })
}

pub fn bar_task() -> SimpleTask {
    Task::new("bar", ["foo"], |ctx| async move {
        let foo: Value = ctx.task_result("foo")?;
        let len = foo
            .as_str()
            .map(str::len)
            .ok_or_else(|| anyhow!("foo did not return a string"))?;
        Ok(Value::from(len))
    })
}

pub fn baz_task() -> SimpleTask {
    Task::new("baz", ["bar"], |ctx| async move {
        ctx.task_result("bar")?;
        Ok(Value::Null)
    })
}

pub fn all_tasks() -> Vec<SimpleTask> {
    vec![foo_task(), bar_task(), baz_task()]
}

/// Same id and dependencies as `task`, but the body fails with `message`.
pub fn failing(task: &SimpleTask, message: &'static str) -> SimpleTask {
    task.with_run(move |_| async move { Err(anyhow!(message)) })
}

/// Builder with `tasks` registered in the given order.
pub fn simple_builder(tasks: impl IntoIterator<Item = SimpleTask>) -> SimpleBuilder {
    let mut builder = WorkflowBuilder::new();
    for task in tasks {
        builder
            .add_task(task)
            .expect("Failed to register task in test builder");
    }
    builder
}
