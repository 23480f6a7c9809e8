use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Canonical task identifier type used throughout the crate.
pub type TaskId = String;

/// Strategy used to walk the task order.
///
/// - `Serial`: one task at a time, in task order.
/// - `Concurrent`: every task waits only for its direct dependencies.
/// - `Staged`: tasks are grouped by height and run one stage at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorStrategy {
    Serial,
    Concurrent,
    Staged,
}

impl Default for ExecutorStrategy {
    fn default() -> Self {
        ExecutorStrategy::Serial
    }
}

impl fmt::Display for ExecutorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutorStrategy::Serial => "serial",
            ExecutorStrategy::Concurrent => "concurrent",
            ExecutorStrategy::Staged => "staged",
        };
        f.write_str(name)
    }
}

impl FromStr for ExecutorStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "serial" => Ok(ExecutorStrategy::Serial),
            "concurrent" => Ok(ExecutorStrategy::Concurrent),
            "staged" => Ok(ExecutorStrategy::Staged),
            other => Err(format!(
                "invalid executor strategy: {other} (expected \"serial\", \"concurrent\" or \"staged\")"
            )),
        }
    }
}
