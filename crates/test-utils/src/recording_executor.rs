use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use taskdag::errors::Result;
use taskdag::exec::{ExecutionInput, WorkflowExecutor};

/// A fake executor that:
/// - runs tasks one by one in *reverse* task order
/// - records which ids it handed to the runner.
///
/// Useful to show that the runner, not the executor, decides skips, and
/// that a custom strategy plugs into a workflow.
pub struct RecordingExecutor {
    executed: Arc<Mutex<Vec<String>>>,
}

impl RecordingExecutor {
    pub fn new(executed: Arc<Mutex<Vec<String>>>) -> Self {
        Self { executed }
    }
}

impl WorkflowExecutor for RecordingExecutor {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn execute(&self, input: ExecutionInput) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let executed = Arc::clone(&self.executed);

        Box::pin(async move {
            for id in input.task_order.iter().rev() {
                executed.lock().unwrap().push(id.clone());
                input.runner.run_task(id.clone()).await?;
            }
            Ok(())
        })
    }
}
