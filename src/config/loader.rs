// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{RawWorkflowConfig, WorkflowConfig};
use crate::errors::Result;

/// Load a configuration file and return the raw `RawWorkflowConfig`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawWorkflowConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawWorkflowConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (serial strategy, no limit, all tasks).
/// - Checks the limit and the task selection.
///
/// Whether selected tasks exist is only known once tasks are registered; that
/// is checked when the workflow is built.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<WorkflowConfig> {
    let raw = load_from_path(path)?;
    WorkflowConfig::try_from(raw)
}

/// Parse and validate configuration held in memory.
pub fn parse_str(contents: &str) -> Result<WorkflowConfig> {
    let raw: RawWorkflowConfig = toml::from_str(contents)?;
    WorkflowConfig::try_from(raw)
}
