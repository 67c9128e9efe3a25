//! Dependency graph builder using petgraph.
//!
//! This module builds a directed graph over dense task ids and produces the
//! execution order the scheduler walks: parents before dependents, with
//! disjoint components concatenated deterministically.

use crate::{Error, Result};
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use tracing::debug;

/// Directed dependency graph over dense task ids.
///
/// Every task in `0..task_count` is a vertex whether or not it has edges, so
/// fully disconnected tasks still appear in the execution order.
pub struct DepGraph {
    /// The directed graph; node weights are the external task ids.
    graph: DiGraph<usize, ()>,
    /// Map from task id to node index.
    index: Vec<NodeIndex>,
}

impl DepGraph {
    /// Create a graph with one vertex per task id in `0..count`.
    #[must_use]
    pub fn with_tasks(count: usize) -> Self {
        let mut graph = DiGraph::with_capacity(count, count * 2);
        let index = (0..count).map(|id| graph.add_node(id)).collect();
        Self { graph, index }
    }

    /// Number of task vertices in the graph.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.index.len()
    }

    /// Number of dependency edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Record that `dependent` cannot start until `parent` has finished.
    ///
    /// Parallel edges are allowed; they do not change the ordering.
    ///
    /// # Panics
    ///
    /// Panics if either id is outside `0..task_count`.
    pub fn add_edge(&mut self, parent: usize, dependent: usize) {
        debug!("adding edge: {parent} -> {dependent}");
        self.graph
            .add_edge(self.index[parent], self.index[dependent], ());
    }

    /// Check if the graph has cycles.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Topological execution order over the whole graph.
    ///
    /// For every edge `parent -> dependent`, the parent precedes the
    /// dependent. Weakly connected components are emitted one after another,
    /// ordered by the smallest task id in each component, so disjoint inputs
    /// still produce a single deterministic sequence without any artificial
    /// connecting edges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CycleDetected`] if the graph contains a cycle.
    pub fn execution_order(&self) -> Result<Vec<usize>> {
        let sorted = toposort(&self.graph, None).map_err(|cycle| Error::CycleDetected {
            task_id: self.graph[cycle.node_id()],
        })?;

        // Key every vertex by the smallest task id reachable through the
        // undirected structure of its component.
        let mut components = UnionFind::<usize>::new(self.graph.node_count());
        for edge in self.graph.raw_edges() {
            components.union(edge.source().index(), edge.target().index());
        }
        let mut component_key = vec![usize::MAX; self.graph.node_count()];
        for idx in self.graph.node_indices() {
            let root = components.find(idx.index());
            let id = self.graph[idx];
            if id < component_key[root] {
                component_key[root] = id;
            }
        }

        let mut order: Vec<usize> = sorted.into_iter().map(|idx| self.graph[idx]).collect();
        // Stable sort: preserves the topological order inside each component.
        order.sort_by_key(|&id| component_key[components.find(self.index[id].index())]);

        debug!("execution order spans {} tasks", order.len());
        Ok(order)
    }
}
