//! Task model: identity, resource demand, simulated runtime, and
//! dependency/waiter wiring.
//!
//! Tasks are owned by a [`TaskSet`], which assigns dense ids in insertion
//! order and maintains the name index used to resolve textual parent
//! references. All cross-task links (`dependencies`, `waiters`) are stored
//! as [`TaskId`]s, never references.

use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// Dense handle to a task inside its [`TaskSet`].
///
/// Doubles as the vertex id in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub usize);

impl TaskId {
    /// Position of the task in its owning set.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Lifecycle of a simulated task.
///
/// Once a task leaves `NotStarted` it never returns; `Complete` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    NotStarted,
    Running,
    Complete,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "not started",
            Self::Running => "running",
            Self::Complete => "complete",
        };
        f.write_str(label)
    }
}

/// Outcome of running a task for a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickStat {
    /// Ticks the task still needs after the interval.
    pub remaining: u64,
    /// Ticks of the interval billed to the task.
    pub busy: u64,
    /// Ticks of the interval left over after the task completed.
    pub idle: u64,
}

/// A single compute task.
#[derive(Debug)]
pub struct Task {
    name: String,
    id: TaskId,
    cores_required: u64,
    ticks_required: u64,
    ticks_remaining: u64,
    state: TaskState,
    /// Raw comma-separated parent list, exactly as supplied by the input.
    dep_spec: String,
    dependencies: Vec<TaskId>,
    waiters: Vec<TaskId>,
    mapped_deps: bool,
}

impl Task {
    fn new(name: String, id: TaskId, cores_required: u64, ticks_required: u64) -> Self {
        Self {
            name,
            id,
            cores_required,
            ticks_required,
            ticks_remaining: ticks_required,
            state: TaskState::NotStarted,
            dep_spec: String::new(),
            dependencies: Vec::new(),
            waiters: Vec::new(),
            mapped_deps: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[must_use]
    pub fn cores_required(&self) -> u64 {
        self.cores_required
    }

    #[must_use]
    pub fn ticks_required(&self) -> u64 {
        self.ticks_required
    }

    #[must_use]
    pub fn ticks_remaining(&self) -> u64 {
        self.ticks_remaining
    }

    #[must_use]
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Store the raw comma-separated parent list for later resolution.
    pub fn set_dep_spec(&mut self, spec: impl Into<String>) {
        self.dep_spec = spec.into();
    }

    #[must_use]
    pub fn dep_spec(&self) -> &str {
        &self.dep_spec
    }

    /// Resolved parent handles. Empty until
    /// [`TaskSet::map_dependencies`] has run.
    #[must_use]
    pub fn dependencies(&self) -> &[TaskId] {
        &self.dependencies
    }

    /// Tasks that list this task among their parents.
    #[must_use]
    pub fn waiters(&self) -> &[TaskId] {
        &self.waiters
    }

    #[must_use]
    pub fn waiter_count(&self) -> usize {
        self.waiters.len()
    }

    /// Number of resolved dependencies, or `None` before mapping.
    #[must_use]
    pub fn dependency_count(&self) -> Option<usize> {
        self.mapped_deps.then_some(self.dependencies.len())
    }

    /// Simulate running this task for `ticks`.
    ///
    /// If the task finishes inside the interval it transitions to
    /// `Complete`; the surplus interval time is reported as `idle` and
    /// `busy` covers the whole interval.
    pub fn run_for(&mut self, ticks: u64) -> TickStat {
        if self.ticks_remaining <= ticks {
            let stat = TickStat {
                remaining: 0,
                busy: ticks,
                idle: ticks - self.ticks_remaining,
            };
            self.ticks_remaining = 0;
            self.state = TaskState::Complete;
            stat
        } else {
            self.ticks_remaining -= ticks;
            TickStat {
                remaining: self.ticks_remaining,
                busy: ticks,
                idle: 0,
            }
        }
    }

    /// Transition `NotStarted` -> `Running` when a node takes the task.
    pub(crate) fn start(&mut self) {
        debug_assert_eq!(self.state, TaskState::NotStarted);
        self.state = TaskState::Running;
    }

    pub(crate) fn add_waiter(&mut self, waiter: TaskId) {
        self.waiters.push(waiter);
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "name: {}; cores_required: {}; exec_time: {}/{}; id: {}; state: {}; \
             dependency count: {}; waiters: {}",
            self.name,
            self.cores_required,
            self.ticks_remaining,
            self.ticks_required,
            self.id.0,
            self.state,
            self.dependencies.len(),
            self.waiters.len(),
        )?;
        if !self.dep_spec.is_empty() {
            write!(f, "; parent tasks: {}", self.dep_spec)?;
        }
        Ok(())
    }
}

/// Owning collection of tasks with a name index.
///
/// Ids are dense vector positions assigned in insertion order, so they can
/// be fed straight to the dependency graph as vertex ids.
#[derive(Debug, Default)]
pub struct TaskSet {
    tasks: Vec<Task>,
    by_name: HashMap<String, TaskId>,
}

impl TaskSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task, assigning it the next dense id.
    ///
    /// # Errors
    ///
    /// Rejects empty or duplicate names and zero core or tick demands.
    pub fn insert(&mut self, name: &str, cores_required: u64, ticks_required: u64) -> Result<TaskId> {
        if name.is_empty() {
            return Err(Error::InvalidDefinition {
                name: name.to_string(),
                reason: "task name must not be empty".to_string(),
            });
        }
        if cores_required == 0 {
            return Err(Error::InvalidDefinition {
                name: name.to_string(),
                reason: "cores_required must be positive".to_string(),
            });
        }
        if ticks_required == 0 {
            return Err(Error::InvalidDefinition {
                name: name.to_string(),
                reason: "execution_time must be positive".to_string(),
            });
        }
        if self.by_name.contains_key(name) {
            return Err(Error::Duplicate {
                name: name.to_string(),
            });
        }

        let id = TaskId(self.tasks.len());
        self.tasks
            .push(Task::new(name.to_string(), id, cores_required, ticks_required));
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up a task id by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<TaskId> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn get(&self, id: TaskId) -> &Task {
        &self.tasks[id.0]
    }

    pub fn get_mut(&mut self, id: TaskId) -> &mut Task {
        &mut self.tasks[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = TaskId> + use<> {
        (0..self.tasks.len()).map(TaskId)
    }

    /// Resolve the task's raw parent list into handles.
    ///
    /// Every name that resolves is appended to the task's dependencies and
    /// the task registers itself as a waiter on that parent, even when other
    /// names fail; `mapped_deps` is set regardless. Names are trimmed and
    /// empty segments are ignored. Duplicate names are kept as duplicate
    /// dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingDependency`] naming the first parent that did
    /// not resolve.
    pub fn map_dependencies(&mut self, id: TaskId) -> Result<()> {
        let mut resolved = Vec::new();
        let mut missing = None;

        for name in self.tasks[id.0]
            .dep_spec
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            match self.by_name.get(name) {
                Some(&parent) => resolved.push(parent),
                None if missing.is_none() => missing = Some(name.to_string()),
                None => {}
            }
        }

        for &parent in &resolved {
            self.tasks[parent.0].add_waiter(id);
        }
        let task = &mut self.tasks[id.0];
        task.dependencies.extend_from_slice(&resolved);
        task.mapped_deps = true;

        match missing {
            None => Ok(()),
            Some(dependency) => Err(Error::MissingDependency {
                task: self.tasks[id.0].name.clone(),
                dependency,
            }),
        }
    }

    /// True iff every resolved parent of the task is complete.
    #[must_use]
    pub fn dependencies_met(&self, id: TaskId) -> bool {
        self.tasks[id.0]
            .dependencies
            .iter()
            .all(|&dep| self.tasks[dep.0].state == TaskState::Complete)
    }
}
