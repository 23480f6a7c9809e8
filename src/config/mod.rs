// src/config/mod.rs

//! Workflow configuration loaded from TOML.
//!
//! - [`model`] holds the raw and validated data model.
//! - [`loader`] reads and parses files.
//! - [`validate`] turns raw config into [`WorkflowConfig`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{ExecutorSection, RawWorkflowConfig, WorkflowConfig, WorkflowSection};
