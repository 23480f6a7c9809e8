// src/lib.rs

//! Dependency-aware task orchestration.
//!
//! Tasks declare the ids they depend on. A [`WorkflowBuilder`] validates the
//! resulting graph (no cycles, no unregistered dependencies), freezes a
//! dependencies-first task order and binds it to an execution strategy.
//! Running the [`Workflow`] invokes every task once, skips tasks whose
//! dependencies errored or were skipped, and reports each transition through
//! a typed event stream.
//!
//! ```ignore
//! let mut builder = WorkflowBuilder::<String, usize>::new();
//! builder.add_task(Task::new("len", Vec::<String>::new(), |ctx| async move {
//!     Ok(ctx.context().len())
//! }))?;
//! let summary = builder.build_serial(BuildOptions::all())?.run("hi".into()).await?;
//! assert!(summary.is_success());
//! ```

pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod task;
pub mod types;

pub use config::WorkflowConfig;
pub use engine::{
    BuildOptions, EventEmitter, EventKind, TaskFinish, TaskSkip, TaskStart, TaskThrow, Workflow,
    WorkflowBuilder, WorkflowEvent, WorkflowStart, WorkflowSummary,
};
pub use errors::{ResultAccessError, WorkflowError};
pub use exec::{ConcurrentExecutor, SerialExecutor, StagedExecutor, WorkflowExecutor};
pub use task::{Task, TaskContext};
pub use types::{ExecutorStrategy, TaskId};
