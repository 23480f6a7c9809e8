// src/config/validate.rs

use std::collections::HashSet;
use std::num::NonZeroUsize;

use crate::config::model::{RawWorkflowConfig, WorkflowConfig};
use crate::errors::{Result, WorkflowError};
use crate::types::ExecutorStrategy;

impl TryFrom<RawWorkflowConfig> for WorkflowConfig {
    type Error = WorkflowError;

    fn try_from(raw: RawWorkflowConfig) -> std::result::Result<Self, Self::Error> {
        let limit = validate_executor(&raw)?;
        validate_selection(&raw)?;
        Ok(WorkflowConfig::new_unchecked(
            raw.executor.strategy,
            limit,
            raw.workflow.tasks,
        ))
    }
}

fn validate_executor(cfg: &RawWorkflowConfig) -> Result<Option<NonZeroUsize>> {
    let Some(limit) = cfg.executor.limit else {
        return Ok(None);
    };

    if cfg.executor.strategy == ExecutorStrategy::Serial {
        return Err(WorkflowError::ConfigError(
            "[executor].limit has no effect with strategy = \"serial\"".to_string(),
        ));
    }

    NonZeroUsize::new(limit).map(Some).ok_or_else(|| {
        WorkflowError::ConfigError("[executor].limit must be >= 1 (got 0)".to_string())
    })
}

fn validate_selection(cfg: &RawWorkflowConfig) -> Result<()> {
    let Some(tasks) = &cfg.workflow.tasks else {
        return Ok(());
    };

    if tasks.is_empty() {
        return Err(WorkflowError::ConfigError(
            "[workflow].tasks must name at least one task (omit it to run everything)"
                .to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for name in tasks {
        if name.trim().is_empty() {
            return Err(WorkflowError::ConfigError(
                "[workflow].tasks contains an empty task id".to_string(),
            ));
        }
        if !seen.insert(name.as_str()) {
            return Err(WorkflowError::ConfigError(format!(
                "[workflow].tasks lists task '{name}' more than once"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_str;

    #[test]
    fn empty_file_means_serial_everything() {
        let cfg = parse_str("").unwrap();
        assert_eq!(cfg, WorkflowConfig::default());
        assert_eq!(cfg.strategy(), ExecutorStrategy::Serial);
        assert!(cfg.selected_tasks().is_none());
    }

    #[test]
    fn reads_strategy_limit_and_selection() {
        let cfg = parse_str(
            r#"
[executor]
strategy = "staged"
limit = 3

[workflow]
tasks = ["bar"]
"#,
        )
        .unwrap();

        assert_eq!(cfg.strategy(), ExecutorStrategy::Staged);
        assert_eq!(cfg.limit(), NonZeroUsize::new(3));
        assert_eq!(cfg.selected_tasks(), Some(&["bar".to_string()][..]));
        assert_eq!(cfg.executor().name(), "staged");
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = parse_str("[executor]\nstrategy = \"concurrent\"\nlimit = 0\n").unwrap_err();
        assert!(matches!(err, WorkflowError::ConfigError(ref m) if m.contains(">= 1")));
    }

    #[test]
    fn limit_with_serial_is_rejected() {
        let err = parse_str("[executor]\nlimit = 2\n").unwrap_err();
        assert!(matches!(err, WorkflowError::ConfigError(ref m) if m.contains("serial")));
    }

    #[test]
    fn bad_selection_is_rejected() {
        assert!(parse_str("[workflow]\ntasks = []\n").is_err());
        assert!(parse_str("[workflow]\ntasks = [\"a\", \"a\"]\n").is_err());
        assert!(parse_str("[workflow]\ntasks = [\" \"]\n").is_err());
    }

    #[test]
    fn unknown_strategy_is_a_toml_error() {
        let err = parse_str("[executor]\nstrategy = \"parallel\"\n").unwrap_err();
        assert!(matches!(err, WorkflowError::TomlError(_)));
    }
}
