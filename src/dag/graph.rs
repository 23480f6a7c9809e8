// src/dag/graph.rs

use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

/// Directed graph over borrowed task ids.
///
/// Edges point from a task to each of its dependencies ("depends on").
/// Storage is a `petgraph` graph map, so nodes and each node's out-neighbors
/// iterate in insertion order and traversal results are deterministic.
///
/// Nothing here guarantees acyclicity; callers that need a valid order must
/// check [`Digraph::has_cycle`] before trusting [`Digraph::topological_sort`].
#[derive(Debug, Clone, Default)]
pub struct Digraph<'a> {
    graph: DiGraphMap<&'a str, ()>,
}

impl<'a> Digraph<'a> {
    pub fn new() -> Self {
        Self {
            graph: DiGraphMap::new(),
        }
    }

    /// Insert a node if it is not already present.
    pub fn add_node(&mut self, id: &'a str) {
        self.graph.add_node(id);
    }

    /// Record that `from` depends on `to`.
    ///
    /// Missing endpoints are created implicitly, so edges may be added before
    /// the dependency itself has been seen.
    pub fn add_edge(&mut self, from: &'a str, to: &'a str) {
        self.graph.add_edge(from, to, ());
    }

    pub fn contains_node(&self, id: &'a str) -> bool {
        self.graph.contains_node(id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.graph.nodes()
    }

    /// Direct dependencies of `id`, in edge insertion order.
    pub fn dependencies_of(&self, id: &'a str) -> Vec<&'a str> {
        self.graph.neighbors(id).collect()
    }

    pub fn has_cycle(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// A node that participates in a cycle, if there is one.
    pub fn find_cycle(&self) -> Option<&'a str> {
        toposort(&self.graph, None).err().map(|cycle| cycle.node_id())
    }

    /// Depth-first post-order over the dependency closure of `selected`
    /// (all nodes in insertion order when `None`).
    ///
    /// Dependencies are emitted before their dependents and each node at most
    /// once. Selected ids that are not in the graph are emitted as-is with no
    /// dependencies; it is up to the caller to reject them.
    pub fn topological_sort(&self, selected: Option<&[&'a str]>) -> Vec<&'a str> {
        let mut visited: HashSet<&'a str> = HashSet::new();
        let mut order = Vec::with_capacity(self.graph.node_count());

        match selected {
            Some(roots) => {
                for &root in roots {
                    self.visit_post_order(root, &mut visited, &mut order);
                }
            }
            None => {
                for root in self.graph.nodes() {
                    self.visit_post_order(root, &mut visited, &mut order);
                }
            }
        }

        order
    }

    fn visit_post_order(
        &self,
        root: &'a str,
        visited: &mut HashSet<&'a str>,
        order: &mut Vec<&'a str>,
    ) {
        if !visited.insert(root) {
            return;
        }

        let mut stack = vec![(root, self.graph.neighbors(root))];

        while let Some((node, neighbors)) = stack.last_mut() {
            match neighbors.next() {
                Some(next) => {
                    if visited.insert(next) {
                        stack.push((next, self.graph.neighbors(next)));
                    }
                }
                None => {
                    order.push(*node);
                    stack.pop();
                }
            }
        }
    }
}
