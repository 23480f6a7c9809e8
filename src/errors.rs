// src/errors.rs

//! Crate-wide error types and aliases.
//!
//! [`WorkflowError`] covers structural problems: mistakes in how a workflow
//! was assembled or configured. These abort `add_task` / `build` / `run`.
//! Ordinary task failures never show up here; they are recorded by the
//! tracker and reported through `taskThrow` events.

use std::any::Any;

use thiserror::Error;

use crate::types::TaskId;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Task with id '{0}' registered twice")]
    DuplicateTask(TaskId),

    #[error("Task with id '{0}' depends on itself")]
    SelfDependency(TaskId),

    #[error("Cycle detected in task graph involving task '{0}'")]
    CyclicGraph(TaskId),

    #[error("Task '{0}' is not registered")]
    UnregisteredDependency(TaskId),

    #[error("Task '{task}' cannot move from {from} to {to}")]
    InvalidTransition {
        task: TaskId,
        from: &'static str,
        to: &'static str,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Executor error: {0}")]
    Executor(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Raised when a task body asks for a result it is not entitled to.
///
/// Each variant means the requesting task most likely forgot to declare the
/// other task as a dependency: a declared dependency that errored or was
/// skipped would have caused the requester to be skipped instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResultAccessError {
    #[error(
        "Requested result of errored task '{0}'; check that it is declared as a dependency"
    )]
    Errored(TaskId),

    #[error(
        "Requested result of skipped task '{0}'; check that it is declared as a dependency"
    )]
    Skipped(TaskId),

    #[error(
        "Requested result of task '{0}' before it finished; check that it is declared as a dependency"
    )]
    NotFinished(TaskId),
}

/// Render a panic payload the way `std` prints it.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WorkflowError>;
