// src/engine/mod.rs

//! Orchestration engine.
//!
//! This module ties together:
//! - the typed lifecycle event stream ([`events`])
//! - the per-run task state and result store ([`tracker`])
//! - workflow assembly and the run entry point ([`workflow`])
//!
//! Graph validation lives in [`crate::dag`]; the strategies that walk the
//! task order live in [`crate::exec`].

pub mod events;
pub mod tracker;
pub mod workflow;

pub use events::{
    EventEmitter, EventKind, EventPayload, ListenerId, TaskFinish, TaskSkip, TaskStart,
    TaskThrow, WorkflowEvent, WorkflowStart,
};
pub use tracker::{TaskState, TaskTracker, WorkflowSummary};
pub use workflow::{BuildOptions, Workflow, WorkflowBuilder};
