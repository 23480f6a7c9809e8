// src/task/registry.rs

use std::collections::HashMap;

use tracing::debug;

use crate::errors::{Result, WorkflowError};
use crate::task::Task;
use crate::types::TaskId;

/// Registered tasks, keyed by id and remembered in registration order.
///
/// Registration order matters: it is the root order used when building the
/// task graph, so it decides the default task order between unrelated tasks.
#[derive(Debug)]
pub struct TaskRegistry<C, R> {
    order: Vec<TaskId>,
    tasks: HashMap<TaskId, Task<C, R>>,
}

impl<C, R> TaskRegistry<C, R> {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            tasks: HashMap::new(),
        }
    }

    pub fn add(&mut self, task: Task<C, R>) -> Result<()> {
        if self.tasks.contains_key(task.id()) {
            return Err(WorkflowError::DuplicateTask(task.id().to_string()));
        }
        if task.dependencies().iter().any(|dep| dep == task.id()) {
            return Err(WorkflowError::SelfDependency(task.id().to_string()));
        }

        debug!(
            task = %task.id(),
            deps = ?task.dependencies(),
            "registered task"
        );

        self.order.push(task.id().to_string());
        self.tasks.insert(task.id().to_string(), task);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Task<C, R>> {
        self.tasks.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tasks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Task<C, R>> {
        self.order.iter().filter_map(|id| self.tasks.get(id))
    }

    /// Immutable copy of the registered tasks, for handing to a built workflow.
    pub fn snapshot(&self) -> HashMap<TaskId, Task<C, R>> {
        self.tasks.clone()
    }
}

impl<C, R> Default for TaskRegistry<C, R> {
    fn default() -> Self {
        Self::new()
    }
}
