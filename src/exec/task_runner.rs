// src/exec/task_runner.rs

//! Single-task execution step.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::anyhow;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, error};

use crate::engine::tracker::TaskTracker;
use crate::errors::{Result, WorkflowError, panic_message};
use crate::exec::backend::RunTask;
use crate::task::{Task, TaskContext};
use crate::types::TaskId;

/// Runs tasks of one workflow run against that run's tracker.
///
/// Cheap to clone: everything is behind an `Arc`.
pub struct TaskRunner<C, R> {
    tasks: Arc<HashMap<TaskId, Task<C, R>>>,
    tracker: Arc<TaskTracker<C, R>>,
    context: Arc<C>,
}

impl<C, R> Clone for TaskRunner<C, R> {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            tracker: Arc::clone(&self.tracker),
            context: Arc::clone(&self.context),
        }
    }
}

impl<C, R> TaskRunner<C, R>
where
    C: Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    pub fn new(
        tasks: Arc<HashMap<TaskId, Task<C, R>>>,
        tracker: Arc<TaskTracker<C, R>>,
        context: Arc<C>,
    ) -> Self {
        Self {
            tasks,
            tracker,
            context,
        }
    }

    /// Skip `id` if a dependency errored or was skipped, otherwise run it.
    ///
    /// - every dependency is checked; both error and skip lists are reported
    /// - a failing or panicking body is recorded as errored for this run
    /// - a [`WorkflowError`] returned by the body is not recorded and is
    ///   returned to the caller, aborting the run
    pub async fn process(&self, id: &str) -> Result<()> {
        let task = self
            .tasks
            .get(id)
            .ok_or_else(|| WorkflowError::UnregisteredDependency(id.to_string()))?;

        let mut errored_dependencies = Vec::new();
        let mut skipped_dependencies = Vec::new();

        for dep in task.dependencies() {
            if self.tracker.is_errored(dep) {
                errored_dependencies.push(dep.clone());
            }
            if self.tracker.is_skipped(dep) {
                skipped_dependencies.push(dep.clone());
            }
        }

        if !errored_dependencies.is_empty() || !skipped_dependencies.is_empty() {
            return self
                .tracker
                .skip(id, errored_dependencies, skipped_dependencies);
        }

        self.tracker.start(id)?;

        let ctx = TaskContext::new(
            id.to_string(),
            Arc::clone(&self.context),
            Arc::clone(&self.tracker),
        );

        // Invoke inside the async block so a panic while building the future
        // is caught as well.
        let outcome = AssertUnwindSafe(async { task.invoke(ctx).await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(result)) => self.tracker.finish(id, result),
            Ok(Err(err)) => match err.downcast::<WorkflowError>() {
                Ok(structural) => {
                    error!(
                        task = %id,
                        error = %structural,
                        "task raised a structural error; aborting run"
                    );
                    Err(structural)
                }
                Err(err) => self.tracker.error(id, err),
            },
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                debug!(task = %id, panic = %message, "task body panicked");
                self.tracker
                    .error(id, anyhow!("task '{id}' panicked: {message}"))
            }
        }
    }
}

impl<C, R> RunTask for TaskRunner<C, R>
where
    C: Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    fn dependencies_of(&self, id: &str) -> &[TaskId] {
        self.tasks
            .get(id)
            .map(|t| t.dependencies())
            .unwrap_or(&[])
    }

    fn run_task(&self, id: TaskId) -> BoxFuture<'static, Result<()>> {
        let runner = self.clone();
        Box::pin(async move { runner.process(&id).await })
    }
}
