//! Dependency DAG ordering for the tickplan planner.
//!
//! This crate provides the directed-graph layer the planner uses to turn a
//! set of task dependencies into a single execution order, using petgraph.
//!
//! Vertices are dense task ids (the position of each task in its owning
//! collection); the crate knows nothing about tasks beyond those integers.
//! Edges run from a parent to the tasks that depend on it, so a topological
//! sort yields parents before dependents.
//!
//! # Example
//!
//! ```
//! use tickplan_task_graph::DepGraph;
//!
//! // task 1 depends on task 0, task 2 depends on task 1
//! let mut graph = DepGraph::with_tasks(3);
//! graph.add_edge(0, 1);
//! graph.add_edge(1, 2);
//!
//! let order = graph.execution_order().unwrap();
//! assert_eq!(order, vec![0, 1, 2]);
//! ```

mod error;
mod graph;

pub use error::{Error, Result};
pub use graph::DepGraph;

/// A topologically sorted sequence of task ids.
///
/// Parents come before the tasks that depend on them; weakly connected
/// components appear one after another.
pub type ExecutionOrder = Vec<usize>;
