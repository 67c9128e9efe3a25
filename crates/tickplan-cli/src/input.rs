//! YAML readers for the two input files.
//!
//! Both files are mappings keyed by name; entry order is preserved (via
//! `IndexMap`) because it drives dense id assignment and every downstream
//! tie-break. The readers parse, then hand each entry to the core owning
//! collections, which enforce positivity and uniqueness.

use crate::errors::CliError;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tickplan_core::{NodePool, TaskSet};
use tracing::debug;

/// One task entry as written in the task file.
#[derive(Debug, Deserialize)]
pub struct TaskEntry {
    /// Simulated runtime in ticks.
    pub execution_time: u64,
    /// Cores consumed while running.
    pub cores_required: u64,
    /// Comma-separated parent task names; absent or empty means none.
    #[serde(default)]
    pub parent_tasks: Option<String>,
}

/// Read the task description file into an owning [`TaskSet`].
///
/// # Errors
///
/// Fails on unreadable files, malformed YAML, and definitions the core
/// rejects (duplicate or empty names, zero demands).
pub fn read_tasks_file(path: &Path) -> Result<TaskSet, CliError> {
    const KIND: &str = "task";

    let content = fs::read_to_string(path).map_err(|source| CliError::FileRead {
        kind: KIND,
        path: path.to_path_buf(),
        source,
    })?;
    let entries: IndexMap<String, TaskEntry> =
        serde_yaml::from_str(&content).map_err(|source| CliError::Parse {
            kind: KIND,
            path: path.to_path_buf(),
            source,
        })?;
    debug!("read {} task entries from {}", entries.len(), path.display());

    let mut tasks = TaskSet::new();
    for (name, entry) in entries {
        let id = tasks
            .insert(&name, entry.cores_required, entry.execution_time)
            .map_err(|source| CliError::InvalidInput {
                kind: KIND,
                path: path.to_path_buf(),
                source,
            })?;
        if let Some(parents) = entry.parent_tasks {
            tasks.get_mut(id).set_dep_spec(parents);
        }
    }
    Ok(tasks)
}

/// Read the compute description file into an owning [`NodePool`].
///
/// # Errors
///
/// Fails on unreadable files, malformed YAML, and definitions the core
/// rejects (duplicate or empty names, zero cores).
pub fn read_compute_file(path: &Path) -> Result<NodePool, CliError> {
    const KIND: &str = "compute";

    let content = fs::read_to_string(path).map_err(|source| CliError::FileRead {
        kind: KIND,
        path: path.to_path_buf(),
        source,
    })?;
    let entries: IndexMap<String, u64> =
        serde_yaml::from_str(&content).map_err(|source| CliError::Parse {
            kind: KIND,
            path: path.to_path_buf(),
            source,
        })?;
    debug!(
        "read {} compute entries from {}",
        entries.len(),
        path.display()
    );

    let mut nodes = NodePool::new();
    for (name, cores) in entries {
        nodes
            .insert(&name, cores)
            .map_err(|source| CliError::InvalidInput {
                kind: KIND,
                path: path.to_path_buf(),
                source,
            })?;
    }
    Ok(nodes)
}
