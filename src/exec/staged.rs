// src/exec/staged.rs

use std::future::Future;
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::dag::partition_by_height;
use crate::errors::Result;
use crate::exec::backend::{ExecutionInput, WorkflowExecutor};
use crate::exec::{join_units, run_limited};

/// Runs tasks in waves of equal height.
///
/// All tasks of a stage run concurrently (optionally limited per stage) and
/// the next stage starts only once the whole previous stage is done.
#[derive(Debug, Clone, Copy, Default)]
pub struct StagedExecutor {
    limit: Option<NonZeroUsize>,
}

impl StagedExecutor {
    pub fn new(limit: Option<NonZeroUsize>) -> Self {
        Self { limit }
    }

    pub fn unbounded() -> Self {
        Self { limit: None }
    }

    pub fn with_limit(limit: NonZeroUsize) -> Self {
        Self { limit: Some(limit) }
    }

    pub fn limit(&self) -> Option<NonZeroUsize> {
        self.limit
    }
}

impl WorkflowExecutor for StagedExecutor {
    fn name(&self) -> &'static str {
        "staged"
    }

    fn execute(&self, input: ExecutionInput) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let stages = partition_by_height(&input.task_order, |id| {
                input.runner.dependencies_of(id)
            });

            for (height, stage) in stages.into_iter().enumerate() {
                debug!(height, tasks = ?stage, "staged executor: starting stage");

                let limiter = self.limit.map(|n| Arc::new(Semaphore::new(n.get())));
                let mut units = JoinSet::new();

                for id in stage {
                    let runner = Arc::clone(&input.runner);
                    let limiter = limiter.clone();
                    units.spawn(async move { run_limited(limiter, runner.run_task(id)).await });
                }

                join_units(&mut units).await?;
            }

            Ok(())
        })
    }
}
