//! Core planning model for tickplan.
//!
//! This crate simulates the execution of interdependent compute tasks on a
//! pool of multi-core nodes and produces a static execution plan: which task
//! runs on which node, in what order, and how long the whole batch takes.
//!
//! The pieces, leaves first:
//!
//! - [`task`]: the task model — resource demand, remaining runtime,
//!   lifecycle state, and dependency/waiter wiring, owned by a [`TaskSet`].
//! - [`compute`]: the compute-node model — core inventory, assigned tasks,
//!   and busy/idle accounting, owned by a [`NodePool`].
//! - [`planner`]: dependency validation, topological ordering, and the
//!   tick-driven best-fit scheduler.
//! - [`analysis`]: utilization and dependency statistics over a finished
//!   plan.
//!
//! Everything is single-threaded and synchronous; the planner owns the task
//! set and node pool for its lifetime and is the only writer while its loop
//! runs.

pub mod analysis;
pub mod compute;
pub mod planner;
pub mod task;

pub use compute::{ComputeNode, NodeId, NodePool, NodeState};
pub use planner::{PlanCounters, Placement, Planner};
pub use task::{Task, TaskId, TaskSet, TaskState, TickStat};

use thiserror::Error;

/// Main error type for planning operations.
///
/// The first two variants are model-construction failures surfaced while the
/// input layer builds the task set and node pool; the rest are the planner's
/// validation statuses. The scheduler itself never fails on valid input —
/// inconsistencies past validation are logic bugs and abort.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("'{name}' is already defined")]
    Duplicate { name: String },

    #[error("invalid definition for '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },

    #[error(
        "core capacity exceeded: task '{task}' needs {required} cores but the largest node has {largest}"
    )]
    CoreCapacityExceeded {
        task: String,
        required: u64,
        largest: u64,
    },

    #[error("task '{task}' depends on missing task '{dependency}'")]
    MissingDependency { task: String, dependency: String },

    #[error("circular dependency in task description (detected through task '{task}')")]
    CircularDependency { task: String },
}

/// Result type alias for planning operations.
pub type Result<T> = std::result::Result<T, Error>;
