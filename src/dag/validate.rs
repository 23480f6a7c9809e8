// src/dag/validate.rs

use tracing::debug;

use crate::dag::graph::Digraph;
use crate::errors::{Result, WorkflowError};
use crate::task::TaskRegistry;
use crate::types::TaskId;

/// Validate the registered tasks and compute the task order.
///
/// - every registered task becomes a node, with an edge to each dependency
///   (dependencies that were never registered still become nodes)
/// - a cycle anywhere in the registered set is an error
/// - the order is the dependency closure of `selected` (everything if `None`)
/// - only ids on that order must be registered, so a narrowed selection
///   tolerates unregistered tasks outside of it
pub fn validate_task_graph<C, R>(
    tasks: &TaskRegistry<C, R>,
    selected: Option<&[TaskId]>,
) -> Result<Vec<TaskId>> {
    let mut graph = Digraph::new();

    for task in tasks.iter() {
        graph.add_node(task.id());
        for dep in task.dependencies() {
            graph.add_edge(task.id(), dep.as_str());
        }
    }

    if let Some(node) = graph.find_cycle() {
        return Err(WorkflowError::CyclicGraph(node.to_string()));
    }

    let roots: Option<Vec<&str>> = selected.map(|ids| ids.iter().map(String::as_str).collect());
    let order = graph.topological_sort(roots.as_deref());

    if let Some(missing) = order.iter().find(|id| !tasks.contains(id)) {
        return Err(WorkflowError::UnregisteredDependency(missing.to_string()));
    }

    debug!(
        nodes = graph.node_count(),
        ?order,
        "validated task graph"
    );

    Ok(order.into_iter().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    fn registry(tasks: &[(&str, &[&str])]) -> TaskRegistry<(), ()> {
        let mut registry = TaskRegistry::new();
        for &(id, deps) in tasks {
            registry
                .add(Task::new(id, deps.iter().copied(), |_| async { Ok(()) }))
                .unwrap();
        }
        registry
    }

    #[test]
    fn orders_tasks_registered_out_of_order() {
        let tasks = registry(&[("bar", &["foo"]), ("foo", &[]), ("baz", &["bar"])]);
        assert_eq!(validate_task_graph(&tasks, None).unwrap(), vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn selection_pulls_in_transitive_dependencies_only() {
        let tasks = registry(&[("foo", &[]), ("bar", &["foo"]), ("baz", &["bar"])]);
        let order = validate_task_graph(&tasks, Some(&["bar".to_string()])).unwrap();
        assert_eq!(order, vec!["foo", "bar"]);
    }

    #[test]
    fn cycle_is_rejected() {
        let tasks = registry(&[("a", &["c"]), ("b", &["a"]), ("c", &["b"])]);
        let err = validate_task_graph(&tasks, None).unwrap_err();
        assert!(matches!(err, WorkflowError::CyclicGraph(_)));
    }

    #[test]
    fn cycle_outside_selection_is_still_rejected() {
        let tasks = registry(&[("foo", &[]), ("a", &["b"]), ("b", &["a"])]);
        let err = validate_task_graph(&tasks, Some(&["foo".to_string()])).unwrap_err();
        assert!(matches!(err, WorkflowError::CyclicGraph(_)));
    }

    #[test]
    fn missing_dependency_is_reported() {
        let tasks = registry(&[("bar", &["foo"])]);
        let err = validate_task_graph(&tasks, None).unwrap_err();
        assert!(matches!(err, WorkflowError::UnregisteredDependency(ref id) if id == "foo"));
    }

    #[test]
    fn missing_dependency_outside_selection_is_tolerated() {
        let tasks = registry(&[("foo", &[]), ("bar", &["ghost"])]);
        let order = validate_task_graph(&tasks, Some(&["foo".to_string()])).unwrap();
        assert_eq!(order, vec!["foo"]);
    }

    #[test]
    fn unknown_selected_task_is_reported() {
        let tasks = registry(&[("foo", &[])]);
        let err = validate_task_graph(&tasks, Some(&["nope".to_string()])).unwrap_err();
        assert!(matches!(err, WorkflowError::UnregisteredDependency(ref id) if id == "nope"));
    }
}
