//! Utilization and dependency statistics over a finished plan.
//!
//! Pure aggregation: the CLI formats these numbers into the human-readable
//! report. Top lists are capped at [`TOP_COUNT`] entries and suppress
//! zero-valued entries.

use crate::compute::{NodeId, NodePool};
use crate::task::{TaskId, TaskSet};

/// Number of entries shown in each "top" list.
pub const TOP_COUNT: usize = 10;

/// Aggregate utilization of the whole node pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolTotals {
    pub node_count: u64,
    pub total_cores: u64,
    /// Core-ticks elapsed across all nodes.
    pub total_ticks: u64,
    pub busy_ticks: u64,
    pub idle_ticks: u64,
    /// Mean core count per node; zero for an empty pool.
    pub mean_cores: f64,
}

/// Statistics gathered for the analysis report.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub totals: PoolTotals,
    /// Nodes by descending assignment count; zero-assignment nodes omitted.
    pub hot_nodes: Vec<NodeId>,
    /// Tasks by descending waiter count; tasks nobody waits on omitted.
    pub most_waited_on: Vec<TaskId>,
    /// Tasks by descending dependency count; independent tasks omitted.
    pub most_dependencies: Vec<TaskId>,
}

/// Aggregate utilization and dependency statistics.
///
/// Ties inside each top list keep input order (the sorts are stable), so the
/// report is deterministic.
#[must_use]
pub fn analyze(tasks: &TaskSet, nodes: &NodePool) -> Analysis {
    let node_count = nodes.len() as u64;
    let total_cores: u64 = nodes.iter().map(|node| node.cores_total()).sum();
    let totals = PoolTotals {
        node_count,
        total_cores,
        total_ticks: nodes.iter().map(|node| node.total_ticks()).sum(),
        busy_ticks: nodes.iter().map(|node| node.busy_ticks()).sum(),
        idle_ticks: nodes.iter().map(|node| node.idle_ticks()).sum(),
        mean_cores: if node_count == 0 {
            0.0
        } else {
            total_cores as f64 / node_count as f64
        },
    };

    let mut hot_nodes: Vec<NodeId> = nodes
        .iter()
        .filter(|node| node.assign_count() > 0)
        .map(|node| node.id())
        .collect();
    hot_nodes.sort_by_key(|&id| std::cmp::Reverse(nodes.get(id).assign_count()));
    hot_nodes.truncate(TOP_COUNT);

    let mut most_waited_on: Vec<TaskId> = tasks
        .iter()
        .filter(|task| task.waiter_count() > 0)
        .map(|task| task.id())
        .collect();
    most_waited_on.sort_by_key(|&id| std::cmp::Reverse(tasks.get(id).waiter_count()));
    most_waited_on.truncate(TOP_COUNT);

    let mut most_dependencies: Vec<TaskId> = tasks
        .iter()
        .filter(|task| task.dependency_count().unwrap_or(0) > 0)
        .map(|task| task.id())
        .collect();
    most_dependencies
        .sort_by_key(|&id| std::cmp::Reverse(tasks.get(id).dependency_count().unwrap_or(0)));
    most_dependencies.truncate(TOP_COUNT);

    Analysis {
        totals,
        hot_nodes,
        most_waited_on,
        most_dependencies,
    }
}
