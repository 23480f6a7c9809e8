// src/dag/mod.rs

//! Task graph representation and validation.
//!
//! - [`graph`] holds a small directed graph over task ids with cycle
//!   detection and dependency-first ordering.
//! - [`validate`] turns a task registry into a validated task order.
//! - [`stages`] groups a task order into height levels for staged execution.

pub mod graph;
pub mod stages;
pub mod validate;

pub use graph::Digraph;
pub use stages::partition_by_height;
pub use validate::validate_task_graph;
