// src/config/model.rs

//! Configuration data model.
//!
//! [`RawWorkflowConfig`] mirrors the TOML file one-to-one. It is turned into
//! a validated [`WorkflowConfig`] via `TryFrom` (see `config::validate`).

use std::num::NonZeroUsize;

use serde::Deserialize;

use crate::engine::BuildOptions;
use crate::exec::{ConcurrentExecutor, SerialExecutor, StagedExecutor, WorkflowExecutor};
use crate::types::{ExecutorStrategy, TaskId};

/// Top-level TOML file, as written by the user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawWorkflowConfig {
    #[serde(default)]
    pub executor: ExecutorSection,

    #[serde(default)]
    pub workflow: WorkflowSection,
}

/// `[executor]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutorSection {
    #[serde(default)]
    pub strategy: ExecutorStrategy,

    /// Maximum number of task bodies running at once. Unbounded if absent.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// `[workflow]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowSection {
    /// Tasks to run (plus their dependencies). Everything if absent.
    #[serde(default)]
    pub tasks: Option<Vec<String>>,
}

/// Validated configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowConfig {
    strategy: ExecutorStrategy,
    limit: Option<NonZeroUsize>,
    selected_tasks: Option<Vec<TaskId>>,
}

impl WorkflowConfig {
    /// Construct without validation; only `config::validate` should call this.
    pub(crate) fn new_unchecked(
        strategy: ExecutorStrategy,
        limit: Option<NonZeroUsize>,
        selected_tasks: Option<Vec<TaskId>>,
    ) -> Self {
        Self {
            strategy,
            limit,
            selected_tasks,
        }
    }

    pub fn strategy(&self) -> ExecutorStrategy {
        self.strategy
    }

    pub fn limit(&self) -> Option<NonZeroUsize> {
        self.limit
    }

    pub fn selected_tasks(&self) -> Option<&[TaskId]> {
        self.selected_tasks.as_deref()
    }

    pub fn build_options(&self) -> BuildOptions {
        match &self.selected_tasks {
            Some(ids) => BuildOptions::select(ids.iter().cloned()),
            None => BuildOptions::all(),
        }
    }

    /// Executor matching the configured strategy and limit.
    pub fn executor(&self) -> Box<dyn WorkflowExecutor> {
        match self.strategy {
            ExecutorStrategy::Serial => Box::new(SerialExecutor::new()),
            ExecutorStrategy::Concurrent => Box::new(ConcurrentExecutor::new(self.limit)),
            ExecutorStrategy::Staged => Box::new(StagedExecutor::new(self.limit)),
        }
    }
}
