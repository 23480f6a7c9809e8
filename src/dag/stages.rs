// src/dag/stages.rs

//! Height partition used by the staged executor.

use std::collections::HashMap;

use crate::types::TaskId;

/// Group a task order into stages by height.
///
/// Height is 0 for a task without dependencies and otherwise one more than
/// the highest of its dependencies. Because `order` is topological, every
/// dependency's height is known by the time a task is reached. Dependencies
/// that are not on the order (never the case for a validated order) are
/// ignored.
///
/// Within a stage, tasks keep their relative position from `order`.
pub fn partition_by_height<'a, F>(order: &'a [TaskId], dependencies_of: F) -> Vec<Vec<TaskId>>
where
    F: Fn(&str) -> &'a [TaskId],
{
    let mut heights: HashMap<&str, usize> = HashMap::with_capacity(order.len());
    let mut stages: Vec<Vec<TaskId>> = Vec::new();

    for id in order {
        let height = dependencies_of(id.as_str())
            .iter()
            .filter_map(|dep| heights.get(dep.as_str()))
            .max()
            .map_or(0, |h| h + 1);

        heights.insert(id.as_str(), height);
        if stages.len() <= height {
            stages.resize_with(height + 1, Vec::new);
        }
        stages[height].push(id.clone());
    }

    stages
}
