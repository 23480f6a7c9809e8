// src/exec/concurrent.rs

use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tracing::debug;

use crate::errors::{Result, WorkflowError};
use crate::exec::backend::{ExecutionInput, WorkflowExecutor};
use crate::exec::{join_units, run_limited};
use crate::types::TaskId;

/// Starts every task as soon as its direct dependencies are done.
///
/// One unit is spawned per task, in task order. A unit waits on the
/// completion signals of its declared dependencies only, then takes a slot
/// from the optional limiter and runs. Waiting does not hold a slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcurrentExecutor {
    limit: Option<NonZeroUsize>,
}

impl ConcurrentExecutor {
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

impl WorkflowExecutor for ConcurrentExecutor {
    fn name(&self) -> &'static str {
        "concurrent"
    }

    fn execute(&self, input: ExecutionInput) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let limiter = self.limit.map(|n| Arc::new(Semaphore::new(n.get())));

            // Receivers stay alive here until every unit has been joined.
            let mut done_signals: HashMap<TaskId, watch::Receiver<bool>> = HashMap::new();
            let mut units = JoinSet::new();

            for id in input.task_order.iter() {
                let (done_tx, done_rx) = watch::channel(false);

                let dependencies: Vec<(TaskId, watch::Receiver<bool>)> = input
                    .runner
                    .dependencies_of(id)
                    .iter()
                    .filter_map(|dep| done_signals.get(dep).map(|rx| (dep.clone(), rx.clone())))
                    .collect();

                done_signals.insert(id.clone(), done_rx);

                let runner = Arc::clone(&input.runner);
                let limiter = limiter.clone();
                let id = id.clone();

                units.spawn(async move {
                    for (dep, mut signal) in dependencies {
                        if signal.wait_for(|done| *done).await.is_err() {
                            // The dependency's unit ended without completing,
                            // which only happens when the run is aborting.
                            debug!(task = %id, dep = %dep, "dependency abandoned; not running task");
                            return Ok(());
                        }
                    }

                    run_limited(limiter, runner.run_task(id.clone())).await?;
                    done_tx.send_replace(true);
                    Ok::<(), WorkflowError>(())
                });
            }

            join_units(&mut units).await
        })
    }
}
