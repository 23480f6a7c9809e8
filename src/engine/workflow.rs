// src/engine/workflow.rs

//! Workflow assembly and the run entry point.
//!
//! [`WorkflowBuilder`] collects tasks and validates them into a
//! [`Workflow`]: a frozen task order, an immutable copy of the tasks, an
//! event emitter and an execution strategy. A workflow can be run any number
//! of times; each run gets a fresh tracker.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{error, info};

use crate::config::WorkflowConfig;
use crate::dag::validate_task_graph;
use crate::engine::events::{EventEmitter, WorkflowEvent, WorkflowStart};
use crate::engine::tracker::{TaskTracker, WorkflowSummary};
use crate::errors::Result;
use crate::exec::{
    ConcurrentExecutor, ExecutionInput, SerialExecutor, StagedExecutor, TaskRunner,
    WorkflowExecutor,
};
use crate::task::{Task, TaskRegistry};
use crate::types::TaskId;

/// Options for [`WorkflowBuilder::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    selected_tasks: Option<Vec<TaskId>>,
}

impl BuildOptions {
    /// Run every registered task.
    pub fn all() -> Self {
        Self::default()
    }

    /// Run only `ids` and whatever they transitively depend on.
    pub fn select<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskId>,
    {
        Self {
            selected_tasks: Some(ids.into_iter().map(Into::into).collect()),
        }
    }

    pub fn selected_tasks(&self) -> Option<&[TaskId]> {
        self.selected_tasks.as_deref()
    }
}

/// Collects tasks for a workflow.
pub struct WorkflowBuilder<C, R> {
    registry: TaskRegistry<C, R>,
}

impl<C, R> WorkflowBuilder<C, R>
where
    C: Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            registry: TaskRegistry::new(),
        }
    }

    /// Register a task.
    ///
    /// Fails on a duplicate id or a task that lists itself as a dependency.
    pub fn add_task(&mut self, task: Task<C, R>) -> Result<()> {
        self.registry.add(task)
    }

    pub fn tasks(&self) -> &TaskRegistry<C, R> {
        &self.registry
    }

    /// Validate the registered tasks and bind them to `executor`.
    ///
    /// Fails on a cycle anywhere in the registered set, or on an id in the
    /// resulting order that is not registered. Tasks added after this call
    /// are not part of the returned workflow.
    pub fn build<E>(&self, executor: E, options: BuildOptions) -> Result<Workflow<C, R>>
    where
        E: WorkflowExecutor + 'static,
    {
        self.build_boxed(Box::new(executor), options)
    }

    pub fn build_serial(&self, options: BuildOptions) -> Result<Workflow<C, R>> {
        self.build(SerialExecutor::new(), options)
    }

    pub fn build_concurrent(
        &self,
        limit: Option<NonZeroUsize>,
        options: BuildOptions,
    ) -> Result<Workflow<C, R>> {
        self.build(ConcurrentExecutor::new(limit), options)
    }

    pub fn build_staged(
        &self,
        limit: Option<NonZeroUsize>,
        options: BuildOptions,
    ) -> Result<Workflow<C, R>> {
        self.build(StagedExecutor::new(limit), options)
    }

    /// Build with the strategy, limit and selection from a loaded config.
    pub fn build_from_config(&self, config: &WorkflowConfig) -> Result<Workflow<C, R>> {
        self.build_boxed(config.executor(), config.build_options())
    }

    fn build_boxed(
        &self,
        executor: Box<dyn WorkflowExecutor>,
        options: BuildOptions,
    ) -> Result<Workflow<C, R>> {
        let task_order = validate_task_graph(&self.registry, options.selected_tasks())?;

        info!(
            executor = executor.name(),
            tasks = task_order.len(),
            registered = self.registry.len(),
            "built workflow"
        );

        Ok(Workflow {
            task_order: task_order.into(),
            tasks: Arc::new(self.registry.snapshot()),
            emitter: Arc::new(EventEmitter::new()),
            executor,
            run_counter: AtomicU64::new(0),
        })
    }
}

impl<C, R> Default for WorkflowBuilder<C, R>
where
    C: Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A validated, runnable workflow.
pub struct Workflow<C, R> {
    task_order: Arc<[TaskId]>,
    tasks: Arc<HashMap<TaskId, Task<C, R>>>,
    emitter: Arc<EventEmitter<C, R>>,
    executor: Box<dyn WorkflowExecutor>,
    run_counter: AtomicU64,
}

impl<C, R> Workflow<C, R>
where
    C: Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    /// Dependencies-first order in which tasks are considered.
    pub fn task_order(&self) -> &[TaskId] {
        &self.task_order
    }

    /// Subscribe here to observe runs.
    pub fn emitter(&self) -> &EventEmitter<C, R> {
        &self.emitter
    }

    pub fn executor_name(&self) -> &'static str {
        self.executor.name()
    }

    /// Run every task on the order once against `context`.
    ///
    /// Task failures do not fail the run; they are reported in the returned
    /// summary and through events. An `Err` is only returned for structural
    /// errors raised while running, in which case no `WorkflowFinish` event
    /// is emitted.
    pub async fn run(&self, context: C) -> Result<WorkflowSummary> {
        let run_id = self.run_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let context = Arc::new(context);

        info!(
            run_id,
            executor = self.executor.name(),
            tasks = self.task_order.len(),
            "workflow run started"
        );
        self.emitter
            .emit(&WorkflowEvent::WorkflowStart(WorkflowStart {
                context: Arc::clone(&context),
                task_order: Arc::clone(&self.task_order),
            }));

        let tracker = Arc::new(TaskTracker::new(Arc::clone(&self.emitter)));
        let runner = TaskRunner::new(Arc::clone(&self.tasks), Arc::clone(&tracker), context);

        let input = ExecutionInput {
            task_order: Arc::clone(&self.task_order),
            runner: Arc::new(runner),
        };

        if let Err(err) = self.executor.execute(input).await {
            error!(run_id, error = %err, "workflow run aborted");
            return Err(err);
        }

        let summary = tracker.summary();
        info!(
            run_id,
            finished = summary.tasks_finished.len(),
            errored = summary.tasks_errored.len(),
            skipped = summary.tasks_skipped.len(),
            "workflow run finished"
        );
        self.emitter
            .emit(&WorkflowEvent::WorkflowFinish(summary.clone()));

        Ok(summary)
    }
}

impl<C, R> std::fmt::Debug for Workflow<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("task_order", &self.task_order)
            .field("executor", &self.executor.name())
            .finish_non_exhaustive()
    }
}
