// src/exec/serial.rs

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::errors::Result;
use crate::exec::backend::{ExecutionInput, WorkflowExecutor};

/// Runs tasks one at a time in task order.
///
/// Since the order is topological, every dependency has reached a terminal
/// state before a dependent is looked at.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialExecutor;

impl SerialExecutor {
    pub fn new() -> Self {
        SerialExecutor
    }
}

impl WorkflowExecutor for SerialExecutor {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn execute(&self, input: ExecutionInput) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            for id in input.task_order.iter() {
                debug!(task = %id, "serial executor: running next task");
                input.runner.run_task(id.clone()).await?;
            }
            Ok(())
        })
    }
}
