// src/task/mod.rs

//! Task definitions and the per-invocation run context.
//!
//! A [`Task`] is an id, an ordered list of dependency ids and an async run
//! function. Its fields are private: once handed to the registry a task is
//! read-only.

pub mod registry;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::engine::tracker::TaskTracker;
use crate::errors::ResultAccessError;
use crate::types::TaskId;

pub use registry::TaskRegistry;

/// Boxed future returned by a task body.
pub type TaskFuture<R> = BoxFuture<'static, anyhow::Result<R>>;

type RunFn<C, R> = Arc<dyn Fn(TaskContext<C, R>) -> TaskFuture<R> + Send + Sync>;

pub struct Task<C, R> {
    id: TaskId,
    dependencies: Vec<TaskId>,
    run: RunFn<C, R>,
}

impl<C: 'static, R: 'static> Task<C, R> {
    /// Declare a task.
    ///
    /// The body receives a [`TaskContext`] and returns the task's result.
    /// Returning an error marks the task as errored for the run; returning a
    /// [`crate::errors::WorkflowError`] aborts the whole run instead.
    pub fn new<I, D, F, Fut>(id: impl Into<TaskId>, dependencies: I, run: F) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<TaskId>,
        F: Fn(TaskContext<C, R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        Self {
            id: id.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            run: erase_run(run),
        }
    }

    /// Same dependencies, different body. Handy for swapping in a failing
    /// variant of an existing task.
    pub fn with_run<F, Fut>(&self, run: F) -> Self
    where
        F: Fn(TaskContext<C, R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        Self {
            id: self.id.clone(),
            dependencies: self.dependencies.clone(),
            run: erase_run(run),
        }
    }
}

impl<C, R> Task<C, R> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dependencies(&self) -> &[TaskId] {
        &self.dependencies
    }

    pub(crate) fn invoke(&self, ctx: TaskContext<C, R>) -> TaskFuture<R> {
        (self.run)(ctx)
    }
}

fn erase_run<C, R, F, Fut>(run: F) -> RunFn<C, R>
where
    C: 'static,
    R: 'static,
    F: Fn(TaskContext<C, R>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
{
    Arc::new(move |ctx: TaskContext<C, R>| -> TaskFuture<R> { Box::pin(run(ctx)) })
}

impl<C, R> Clone for Task<C, R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            dependencies: self.dependencies.clone(),
            run: Arc::clone(&self.run),
        }
    }
}

impl<C, R> fmt::Debug for Task<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// What a running task body can see: the run's context value and the
/// results of tasks that already finished.
pub struct TaskContext<C, R> {
    task: TaskId,
    context: Arc<C>,
    tracker: Arc<TaskTracker<C, R>>,
}

impl<C: 'static, R: Clone + 'static> TaskContext<C, R> {
    pub(crate) fn new(task: TaskId, context: Arc<C>, tracker: Arc<TaskTracker<C, R>>) -> Self {
        Self {
            task,
            context,
            tracker,
        }
    }

    /// Id of the task this context was created for.
    pub fn task_id(&self) -> &str {
        &self.task
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// Result of a dependency.
    ///
    /// Fails if `id` errored, was skipped or has not finished yet, which
    /// usually means it was not declared as a dependency.
    pub fn task_result(&self, id: &str) -> Result<R, ResultAccessError> {
        self.tracker.get_result(id)
    }
}
