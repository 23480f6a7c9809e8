// src/engine/tracker.rs

//! Per-run task state and result store.
//!
//! One [`TaskTracker`] exists per workflow run. It is the only piece of
//! mutable state shared by concurrently running task units, so every
//! transition goes through a mutex. The lifecycle event for a transition is
//! emitted while the transition is applied, which keeps the event stream in
//! the same order as the state changes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::engine::events::{
    EventEmitter, TaskFinish, TaskSkip, TaskStart, TaskThrow, WorkflowEvent,
};
use crate::errors::{Result, ResultAccessError, WorkflowError};
use crate::types::TaskId;

/// Terminal snapshot of a run, in the order tasks reached their final state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub tasks_finished: Vec<TaskId>,
    pub tasks_errored: Vec<TaskId>,
    pub tasks_skipped: Vec<TaskId>,
}

impl WorkflowSummary {
    /// `true` when nothing errored and nothing was skipped.
    pub fn is_success(&self) -> bool {
        self.tasks_errored.is_empty() && self.tasks_skipped.is_empty()
    }
}

/// Per-run state of a task. Absence from the tracker means "not started".
#[derive(Debug, Clone)]
pub enum TaskState<R> {
    Running,
    Finished(R),
    Errored(Arc<anyhow::Error>),
    Skipped {
        errored_dependencies: Vec<TaskId>,
        skipped_dependencies: Vec<TaskId>,
    },
}

impl<R> TaskState<R> {
    fn label(&self) -> &'static str {
        match self {
            TaskState::Running => "running",
            TaskState::Finished(_) => "finished",
            TaskState::Errored(_) => "errored",
            TaskState::Skipped { .. } => "skipped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskState::Running)
    }
}

struct TrackerState<R> {
    tasks: HashMap<TaskId, TaskState<R>>,
    finished: Vec<TaskId>,
    errored: Vec<TaskId>,
    skipped: Vec<TaskId>,
}

pub struct TaskTracker<C, R> {
    emitter: Arc<EventEmitter<C, R>>,
    state: Mutex<TrackerState<R>>,
}

impl<C: 'static, R: Clone + 'static> TaskTracker<C, R> {
    pub fn new(emitter: Arc<EventEmitter<C, R>>) -> Self {
        Self {
            emitter,
            state: Mutex::new(TrackerState {
                tasks: HashMap::new(),
                finished: Vec::new(),
                errored: Vec::new(),
                skipped: Vec::new(),
            }),
        }
    }

    pub fn is_finished(&self, id: &str) -> bool {
        matches!(self.lock().tasks.get(id), Some(TaskState::Finished(_)))
    }

    pub fn is_errored(&self, id: &str) -> bool {
        matches!(self.lock().tasks.get(id), Some(TaskState::Errored(_)))
    }

    pub fn is_skipped(&self, id: &str) -> bool {
        matches!(self.lock().tasks.get(id), Some(TaskState::Skipped { .. }))
    }

    /// Current state of `id`, or `None` if it has not been attempted yet.
    pub fn task_state(&self, id: &str) -> Option<TaskState<R>> {
        self.lock().tasks.get(id).cloned()
    }

    /// Result of a finished task.
    pub fn get_result(&self, id: &str) -> std::result::Result<R, ResultAccessError> {
        match self.lock().tasks.get(id) {
            Some(TaskState::Finished(result)) => Ok(result.clone()),
            Some(TaskState::Errored(_)) => Err(ResultAccessError::Errored(id.to_string())),
            Some(TaskState::Skipped { .. }) => Err(ResultAccessError::Skipped(id.to_string())),
            Some(TaskState::Running) | None => {
                Err(ResultAccessError::NotFinished(id.to_string()))
            }
        }
    }

    pub fn start(&self, id: &str) -> Result<()> {
        let mut state = self.lock();
        if let Some(existing) = state.tasks.get(id) {
            return Err(invalid_transition(id, existing.label(), "running"));
        }

        debug!(task = %id, "task started");
        self.emitter
            .emit(&WorkflowEvent::TaskStart(TaskStart { id: id.to_string() }));
        state.tasks.insert(id.to_string(), TaskState::Running);
        Ok(())
    }

    pub fn finish(&self, id: &str, result: R) -> Result<()> {
        let mut state = self.lock();
        expect_running(&state, id, "finished")?;

        info!(task = %id, "task finished");
        self.emitter.emit(&WorkflowEvent::TaskFinish(TaskFinish {
            id: id.to_string(),
            result: result.clone(),
        }));
        state.tasks.insert(id.to_string(), TaskState::Finished(result));
        state.finished.push(id.to_string());
        Ok(())
    }

    pub fn error(&self, id: &str, cause: anyhow::Error) -> Result<()> {
        let mut state = self.lock();
        expect_running(&state, id, "errored")?;

        let cause = Arc::new(cause);
        warn!(task = %id, error = %cause, "task errored");
        self.emitter.emit(&WorkflowEvent::TaskThrow(TaskThrow {
            id: id.to_string(),
            error: Arc::clone(&cause),
        }));
        state.tasks.insert(id.to_string(), TaskState::Errored(cause));
        state.errored.push(id.to_string());
        Ok(())
    }

    pub fn skip(
        &self,
        id: &str,
        errored_dependencies: Vec<TaskId>,
        skipped_dependencies: Vec<TaskId>,
    ) -> Result<()> {
        let mut state = self.lock();
        if let Some(existing) = state.tasks.get(id) {
            return Err(invalid_transition(id, existing.label(), "skipped"));
        }

        warn!(
            task = %id,
            errored = ?errored_dependencies,
            skipped = ?skipped_dependencies,
            "skipping task because of upstream failures"
        );
        self.emitter.emit(&WorkflowEvent::TaskSkip(TaskSkip {
            id: id.to_string(),
            errored_dependencies: errored_dependencies.clone(),
            skipped_dependencies: skipped_dependencies.clone(),
        }));
        state.tasks.insert(
            id.to_string(),
            TaskState::Skipped {
                errored_dependencies,
                skipped_dependencies,
            },
        );
        state.skipped.push(id.to_string());
        Ok(())
    }

    pub fn summary(&self) -> WorkflowSummary {
        let state = self.lock();
        WorkflowSummary {
            tasks_finished: state.finished.clone(),
            tasks_errored: state.errored.clone(),
            tasks_skipped: state.skipped.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn expect_running<R>(state: &TrackerState<R>, id: &str, to: &'static str) -> Result<()> {
    match state.tasks.get(id) {
        Some(TaskState::Running) => Ok(()),
        Some(other) => Err(invalid_transition(id, other.label(), to)),
        None => Err(invalid_transition(id, "unstarted", to)),
    }
}

fn invalid_transition(id: &str, from: &'static str, to: &'static str) -> WorkflowError {
    WorkflowError::InvalidTransition {
        task: id.to_string(),
        from,
        to,
    }
}
