// src/exec/backend.rs

//! Pluggable execution strategy abstraction.
//!
//! A built workflow talks to a [`WorkflowExecutor`] instead of walking the
//! task order itself. The executor only sees a type-erased [`RunTask`]
//! handle, so strategies are independent of the workflow's context and
//! result types, and tests can plug in their own strategy.
//!
//! Contract for every implementation: each id in the task order is run
//! exactly once through [`RunTask::run_task`], and never before all of its
//! dependencies' `run_task` futures have completed. A structural error from
//! `run_task` must be returned, after which remaining tasks may be dropped.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::errors::Result;
use crate::types::TaskId;

/// Single-task execution step, as seen by an executor.
pub trait RunTask: Send + Sync + 'static {
    /// Declared dependencies of `id` (empty for unknown ids).
    fn dependencies_of(&self, id: &str) -> &[TaskId];

    /// Skip, or run and record, a single task.
    ///
    /// The returned future owns everything it needs, so it can be spawned.
    /// Task failures are recorded by the tracker and resolve to `Ok(())`;
    /// only structural errors resolve to `Err`.
    fn run_task(&self, id: TaskId) -> BoxFuture<'static, Result<()>>;
}

/// Everything an executor needs for one run.
#[derive(Clone)]
pub struct ExecutionInput {
    pub task_order: Arc<[TaskId]>,
    pub runner: Arc<dyn RunTask>,
}

/// Strategy that drives [`RunTask`] across a task order.
pub trait WorkflowExecutor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn execute(&self, input: ExecutionInput) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
