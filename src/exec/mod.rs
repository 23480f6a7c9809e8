// src/exec/mod.rs

//! Execution layer.
//!
//! - [`backend`] defines the [`WorkflowExecutor`] seam and the type-erased
//!   [`RunTask`] handle executors drive.
//! - [`task_runner`] is the single-task step: skip decision, body
//!   invocation, and recording the outcome in the tracker.
//! - [`serial`], [`concurrent`] and [`staged`] are the built-in strategies.

pub mod backend;
pub mod concurrent;
pub mod serial;
pub mod staged;
pub mod task_runner;

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::errors::{Result, WorkflowError};

pub use backend::{ExecutionInput, RunTask, WorkflowExecutor};
pub use concurrent::ConcurrentExecutor;
pub use serial::SerialExecutor;
pub use staged::StagedExecutor;
pub use task_runner::TaskRunner;

/// Await `unit` while holding a slot from `limiter`, if there is one.
pub(crate) async fn run_limited(
    limiter: Option<Arc<Semaphore>>,
    unit: BoxFuture<'static, Result<()>>,
) -> Result<()> {
    let _permit = match limiter {
        Some(semaphore) => Some(
            semaphore
                .acquire_owned()
                .await
                .map_err(|_| WorkflowError::Executor("concurrency limiter closed".to_string()))?,
        ),
        None => None,
    };

    unit.await
}

/// Join every spawned unit, stopping at the first error.
///
/// On error the remaining units are aborted.
pub(crate) async fn join_units(units: &mut JoinSet<Result<()>>) -> Result<()> {
    while let Some(joined) = units.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(error = %err, remaining = units.len(), "aborting remaining task units");
                units.abort_all();
                return Err(err);
            }
            Err(join_err) => {
                units.abort_all();
                return Err(WorkflowError::Executor(format!(
                    "task unit did not complete: {join_err}"
                )));
            }
        }
    }

    Ok(())
}
