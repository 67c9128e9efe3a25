//! Error types for dependency graph operations.

use std::fmt;

/// Result type for dependency graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while ordering the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A dependency cycle was detected in the graph.
    CycleDetected {
        /// Id of a task on the cycle.
        task_id: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CycleDetected { task_id } => {
                write!(f, "dependency cycle detected through task {task_id}")
            }
        }
    }
}

impl std::error::Error for Error {}
