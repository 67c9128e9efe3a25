//! Compute-node model: core inventory, assigned tasks, and busy/idle
//! accounting.
//!
//! Nodes are owned by a [`NodePool`]; assignments are recorded as
//! [`TaskId`]s, so ticking a node needs the owning [`TaskSet`] to drive the
//! tasks themselves.

use crate::task::{TaskId, TaskSet, TaskState};
use crate::{Error, Result, Task};
use std::collections::HashMap;
use std::fmt;

/// Dense handle to a node inside its [`NodePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Availability of a node, derived from its core counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// All cores available.
    Free,
    /// Some cores assigned, some available.
    PartiallyAvailable,
    /// No cores available.
    Busy,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Free => "free",
            Self::PartiallyAvailable => "partially available",
            Self::Busy => "busy",
        };
        f.write_str(label)
    }
}

/// A single multi-core compute node.
#[derive(Debug)]
pub struct ComputeNode {
    name: String,
    id: NodeId,
    cores_total: u64,
    cores_available: u64,
    current_tasks: Vec<TaskId>,
    assign_count: u64,
    completed_tasks: u64,
    cumulative_busy_ticks: u64,
    cumulative_idle_ticks: u64,
}

impl ComputeNode {
    fn new(name: String, id: NodeId, cores_total: u64) -> Self {
        Self {
            name,
            id,
            cores_total,
            cores_available: cores_total,
            current_tasks: Vec::new(),
            assign_count: 0,
            completed_tasks: 0,
            cumulative_busy_ticks: 0,
            cumulative_idle_ticks: 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn cores_total(&self) -> u64 {
        self.cores_total
    }

    #[must_use]
    pub fn cores_available(&self) -> u64 {
        self.cores_available
    }

    /// Tasks currently placed on this node.
    #[must_use]
    pub fn current_tasks(&self) -> &[TaskId] {
        &self.current_tasks
    }

    /// Lifetime count of assignments to this node.
    #[must_use]
    pub fn assign_count(&self) -> u64 {
        self.assign_count
    }

    /// Lifetime count of tasks that completed on this node.
    #[must_use]
    pub fn completed_tasks(&self) -> u64 {
        self.completed_tasks
    }

    /// Busy ticks summed across all cores.
    #[must_use]
    pub fn busy_ticks(&self) -> u64 {
        self.cumulative_busy_ticks
    }

    /// Idle ticks summed across all cores.
    #[must_use]
    pub fn idle_ticks(&self) -> u64 {
        self.cumulative_idle_ticks
    }

    /// Total core-ticks elapsed on this node.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.cumulative_busy_ticks + self.cumulative_idle_ticks
    }

    /// Availability state, derived from the core counters.
    #[must_use]
    pub fn state(&self) -> NodeState {
        if self.cores_available == self.cores_total {
            NodeState::Free
        } else if self.cores_available == 0 {
            NodeState::Busy
        } else {
            NodeState::PartiallyAvailable
        }
    }

    /// Take ownership of a task and allocate its cores.
    ///
    /// # Panics
    ///
    /// The task must not have started and the node must have enough free
    /// cores; violating either is a scheduler logic bug.
    pub fn assign(&mut self, task: &mut Task) {
        assert_eq!(
            task.state(),
            TaskState::NotStarted,
            "task '{}' assigned twice",
            task.name()
        );
        assert!(
            self.cores_available >= task.cores_required(),
            "node '{}' has {} cores free but task '{}' needs {}",
            self.name,
            self.cores_available,
            task.name(),
            task.cores_required()
        );
        task.start();
        self.current_tasks.push(task.id());
        self.cores_available -= task.cores_required();
        self.assign_count += 1;
    }

    /// Advance simulated time by `ticks` on this node.
    ///
    /// Runs every assigned task for the interval, returns the cores of
    /// completed tasks to the pool, and updates the cumulative busy/idle
    /// counters. Returns the number of tasks that completed during this
    /// call.
    ///
    /// Accounting convention: cores freed by a task that completes
    /// mid-interval stay billed as busy for the whole interval; only cores
    /// with no task at the start of the call count as idle. This keeps
    /// `busy + idle == cores_total * ticks` an identity per call.
    ///
    /// # Panics
    ///
    /// Panics on a zero-length interval or an accounting mismatch.
    pub fn tick(&mut self, ticks: u64, tasks: &mut TaskSet) -> u64 {
        assert!(ticks > 0, "tick interval must be positive");

        let mut busy = 0;
        let mut cores_used = 0;
        let mut completed = 0;

        let assigned = std::mem::take(&mut self.current_tasks);
        for id in assigned {
            let task = tasks.get_mut(id);
            let cores = task.cores_required();
            let stat = task.run_for(ticks);

            cores_used += cores;
            busy += stat.busy * cores;

            if stat.remaining == 0 {
                self.cores_available += cores;
                completed += 1;
            } else {
                self.current_tasks.push(id);
            }
        }

        assert!(
            self.cores_available <= self.cores_total,
            "node '{}' freed more cores than it owns",
            self.name
        );
        let idle = (self.cores_total - cores_used) * ticks;
        assert_eq!(
            busy + idle,
            self.cores_total * ticks,
            "tick accounting mismatch on node '{}'",
            self.name
        );

        self.cumulative_busy_ticks += busy;
        self.cumulative_idle_ticks += idle;
        self.completed_tasks += completed;
        completed
    }
}

impl fmt::Display for ComputeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "name: {}; cores: {}/{}; state: {}",
            self.name,
            self.cores_available,
            self.cores_total,
            self.state()
        )
    }
}

/// Owning collection of compute nodes with a name index.
#[derive(Debug, Default)]
pub struct NodePool {
    nodes: Vec<ComputeNode>,
    by_name: HashMap<String, NodeId>,
}

impl NodePool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, assigning it the next dense id.
    ///
    /// # Errors
    ///
    /// Rejects empty or duplicate names and zero core counts.
    pub fn insert(&mut self, name: &str, cores: u64) -> Result<NodeId> {
        if name.is_empty() {
            return Err(Error::InvalidDefinition {
                name: name.to_string(),
                reason: "node name must not be empty".to_string(),
            });
        }
        if cores == 0 {
            return Err(Error::InvalidDefinition {
                name: name.to_string(),
                reason: "core count must be positive".to_string(),
            });
        }
        if self.by_name.contains_key(name) {
            return Err(Error::Duplicate {
                name: name.to_string(),
            });
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(ComputeNode::new(name.to_string(), id, cores));
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> &ComputeNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut ComputeNode {
        &mut self.nodes[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComputeNode> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ComputeNode> {
        self.nodes.iter_mut()
    }

    /// Core count of the largest node, if any.
    #[must_use]
    pub fn max_cores(&self) -> Option<u64> {
        self.nodes.iter().map(ComputeNode::cores_total).max()
    }
}
