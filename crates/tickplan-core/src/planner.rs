//! Dependency validation and the tick-driven best-fit scheduler.
//!
//! The planner owns the task set and node pool, validates them once, and
//! then simulates co-execution: each outer iteration places every runnable
//! task it can (largest, most waited-on first, onto the node with the least
//! sufficient availability) and then jumps simulated time forward to the
//! next task completion.

use crate::compute::{NodeId, NodePool};
use crate::task::{TaskId, TaskSet, TaskState};
use crate::{Error, Result};
use tickplan_task_graph::DepGraph;
use tracing::{debug, info};

/// A single placement decision: which task runs on which node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub task: TaskId,
    pub node: NodeId,
}

/// Elapsed-time and contention counters accumulated while scheduling.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlanCounters {
    /// Simulated ticks from first placement to last completion.
    pub required_ticks: u64,
    /// Placement attempts skipped because a dependency was incomplete,
    /// summed per task per iteration (a measure of blocking churn, not of
    /// distinct tasks).
    pub dep_wait: u64,
    /// Nodes walked past because their free cores were insufficient.
    pub compute_wait: u64,
    /// Iterations cut short because no node had a free core left.
    pub all_cores_busy: u64,
    /// Distinct tasks that were dependency-blocked at least once.
    pub blocked_tasks: u64,
}

/// Generates an execution plan for a set of tasks over a pool of compute
/// nodes.
///
/// Call [`validate`](Planner::validate) exactly once, then
/// [`schedule`](Planner::schedule); the accessors expose the placed
/// schedule, the counters, and the underlying models for reporting.
pub struct Planner {
    tasks: TaskSet,
    nodes: NodePool,
    sequence: Vec<TaskId>,
    validated: bool,
    schedule: Vec<Placement>,
    counters: PlanCounters,
}

impl Planner {
    #[must_use]
    pub fn new(tasks: TaskSet, nodes: NodePool) -> Self {
        Self {
            tasks,
            nodes,
            sequence: Vec::new(),
            validated: false,
            schedule: Vec::new(),
            counters: PlanCounters::default(),
        }
    }

    #[must_use]
    pub fn tasks(&self) -> &TaskSet {
        &self.tasks
    }

    #[must_use]
    pub fn nodes(&self) -> &NodePool {
        &self.nodes
    }

    /// Placement decisions made so far, in the order they were made.
    #[must_use]
    pub fn placements(&self) -> &[Placement] {
        &self.schedule
    }

    #[must_use]
    pub fn counters(&self) -> PlanCounters {
        self.counters
    }

    /// Topological execution order produced by validation.
    #[must_use]
    pub fn job_sequence(&self) -> &[TaskId] {
        &self.sequence
    }

    /// Check the task and compute descriptions and build the execution
    /// order.
    ///
    /// Verifies that every task fits on at least the largest node, resolves
    /// every textual parent reference, and topologically sorts the
    /// dependency graph. Idempotent after success.
    ///
    /// # Errors
    ///
    /// [`Error::CoreCapacityExceeded`], [`Error::MissingDependency`] (naming
    /// the offending task), or [`Error::CircularDependency`].
    pub fn validate(&mut self) -> Result<()> {
        if self.validated {
            return Ok(());
        }

        let largest = self.nodes.max_cores().unwrap_or(0);
        let mut graph = DepGraph::with_tasks(self.tasks.len());

        let ids: Vec<TaskId> = self.tasks.ids().collect();
        for id in ids {
            let task = self.tasks.get(id);
            if task.cores_required() > largest {
                return Err(Error::CoreCapacityExceeded {
                    task: task.name().to_string(),
                    required: task.cores_required(),
                    largest,
                });
            }

            self.tasks.map_dependencies(id)?;
            for &parent in self.tasks.get(id).dependencies() {
                graph.add_edge(parent.index(), id.index());
            }
        }

        let order = graph.execution_order().map_err(|err| {
            let tickplan_task_graph::Error::CycleDetected { task_id } = err;
            Error::CircularDependency {
                task: self.tasks.get(TaskId(task_id)).name().to_string(),
            }
        })?;
        self.sequence = order.into_iter().map(TaskId).collect();

        self.validated = true;
        info!(
            "validated {} tasks against {} nodes ({} dependency edges)",
            self.tasks.len(),
            self.nodes.len(),
            graph.edge_count()
        );
        Ok(())
    }

    /// Simulate execution and build the plan.
    ///
    /// Runs the best-fit loop until every task is complete and returns the
    /// placement sequence. Tasks already complete (from an earlier call) are
    /// not rescheduled, so calling this twice returns the same plan.
    ///
    /// # Panics
    ///
    /// Panics if called before a successful [`validate`](Planner::validate),
    /// or if the loop ever stalls with work left — both are logic bugs, not
    /// input errors.
    pub fn schedule(&mut self) -> &[Placement] {
        assert!(self.validated, "schedule() called before validate()");

        let mut remaining = self
            .tasks
            .iter()
            .filter(|task| task.state() != TaskState::Complete)
            .count() as u64;
        let mut running: Vec<TaskId> = Vec::new();
        let mut was_blocked = vec![false; self.tasks.len()];

        while remaining > 0 {
            // Nodes with at least one free core, least availability first.
            let mut avail: Vec<NodeId> = self
                .nodes
                .iter()
                .filter(|node| node.cores_available() > 0)
                .map(|node| node.id())
                .collect();
            avail.sort_by_key(|&id| self.nodes.get(id).cores_available());

            // Runnable tasks in dependency order; blocked walks feed the
            // churn counter.
            let mut runnable: Vec<TaskId> = Vec::new();
            for &id in &self.sequence {
                if self.tasks.get(id).state() != TaskState::NotStarted {
                    continue;
                }
                if self.tasks.dependencies_met(id) {
                    runnable.push(id);
                } else {
                    self.counters.dep_wait += 1;
                    if !was_blocked[id.index()] {
                        was_blocked[id.index()] = true;
                        self.counters.blocked_tasks += 1;
                    }
                }
            }

            // Smallest demand first; the placement walk below goes from the
            // back, so the largest, most waited-on tasks are tried first.
            runnable.sort_by_key(|&id| {
                let task = self.tasks.get(id);
                (task.cores_required(), task.waiter_count())
            });

            let mut nodes_open = avail.len();
            for &task_id in runnable.iter().rev() {
                let demand = self.tasks.get(task_id).cores_required();
                for &node_id in &avail {
                    if self.nodes.get(node_id).cores_available() < demand {
                        self.counters.compute_wait += 1;
                        continue;
                    }
                    debug!(
                        "placing task '{}' on node '{}'",
                        self.tasks.get(task_id).name(),
                        self.nodes.get(node_id).name()
                    );
                    self.schedule.push(Placement {
                        task: task_id,
                        node: node_id,
                    });
                    let node = self.nodes.get_mut(node_id);
                    node.assign(self.tasks.get_mut(task_id));
                    running.push(task_id);
                    if node.cores_available() == 0 {
                        nodes_open -= 1;
                    }
                    break;
                }
                if nodes_open == 0 {
                    self.counters.all_cores_busy += 1;
                    break;
                }
            }

            // Jump to the next completion.
            let skip = running
                .iter()
                .map(|&id| self.tasks.get(id).ticks_remaining())
                .min()
                .expect("scheduler stalled with tasks remaining and nothing running");
            debug_assert!(skip > 0);

            for node in self.nodes.iter_mut() {
                remaining -= node.tick(skip, &mut self.tasks);
            }
            self.counters.required_ticks += skip;

            running.retain(|&id| self.tasks.get(id).state() != TaskState::Complete);
        }

        info!(
            "scheduled {} placements over {} simulated ticks",
            self.schedule.len(),
            self.counters.required_ticks
        );
        &self.schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(
        tasks: &mut TaskSet,
        name: &str,
        cores: u64,
        ticks: u64,
        parents: &str,
    ) -> TaskId {
        let id = tasks.insert(name, cores, ticks).unwrap();
        if !parents.is_empty() {
            tasks.get_mut(id).set_dep_spec(parents);
        }
        id
    }

    fn planner(tasks: TaskSet, nodes: NodePool) -> Planner {
        let mut planner = Planner::new(tasks, nodes);
        planner.validate().unwrap();
        planner
    }

    fn placement_names(planner: &Planner) -> Vec<(String, String)> {
        planner
            .placements()
            .iter()
            .map(|p| {
                (
                    planner.tasks().get(p.task).name().to_string(),
                    planner.nodes().get(p.node).name().to_string(),
                )
            })
            .collect()
    }

    /// Linear chain: every task waits for its parent, all on one node.
    #[test]
    fn linear_chain_schedules_in_order() {
        let mut tasks = TaskSet::new();
        task(&mut tasks, "a", 1, 2, "");
        task(&mut tasks, "b", 1, 3, "a");
        task(&mut tasks, "c", 1, 1, "b");
        let mut nodes = NodePool::new();
        nodes.insert("n1", 4).unwrap();

        let mut planner = planner(tasks, nodes);
        planner.schedule();

        assert_eq!(
            placement_names(&planner),
            vec![
                ("a".to_string(), "n1".to_string()),
                ("b".to_string(), "n1".to_string()),
                ("c".to_string(), "n1".to_string()),
            ]
        );
        let counters = planner.counters();
        assert_eq!(counters.required_ticks, 6);
        // b and c blocked in the first iteration, c again in the second.
        assert_eq!(counters.dep_wait, 3);
        assert_eq!(counters.blocked_tasks, 2);
        assert_eq!(counters.compute_wait, 0);
    }

    /// Three equal independent tasks on two nodes: two placed in the first
    /// iteration, the third after a completion frees a node.
    #[test]
    fn parallel_independents_fill_both_nodes() {
        let mut tasks = TaskSet::new();
        task(&mut tasks, "a", 2, 5, "");
        task(&mut tasks, "b", 2, 5, "");
        task(&mut tasks, "c", 2, 5, "");
        let mut nodes = NodePool::new();
        nodes.insert("n1", 2).unwrap();
        nodes.insert("n2", 2).unwrap();

        let mut planner = planner(tasks, nodes);
        planner.schedule();

        let placements = placement_names(&planner);
        assert_eq!(placements.len(), 3);
        // First two placements land on distinct nodes in the same iteration.
        assert_ne!(placements[0].1, placements[1].1);
        assert_eq!(planner.counters().required_ticks, 10);
        assert_eq!(planner.counters().all_cores_busy, 1);
        for node in planner.nodes().iter() {
            assert_eq!(node.cores_available(), node.cores_total());
        }
    }

    /// A task larger than every node is rejected before scheduling.
    #[test]
    fn oversized_task_fails_validation() {
        let mut tasks = TaskSet::new();
        task(&mut tasks, "big", 4, 1, "");
        let mut nodes = NodePool::new();
        nodes.insert("n1", 2).unwrap();

        let mut planner = Planner::new(tasks, nodes);
        assert_eq!(
            planner.validate(),
            Err(Error::CoreCapacityExceeded {
                task: "big".to_string(),
                required: 4,
                largest: 2,
            })
        );
        assert!(planner.placements().is_empty());
    }

    #[test]
    fn empty_pool_fails_every_task() {
        let mut tasks = TaskSet::new();
        task(&mut tasks, "a", 1, 1, "");
        let mut planner = Planner::new(tasks, NodePool::new());
        assert!(matches!(
            planner.validate(),
            Err(Error::CoreCapacityExceeded { largest: 0, .. })
        ));
    }

    /// A parent name that resolves to nothing names the offending task.
    #[test]
    fn missing_parent_fails_validation() {
        let mut tasks = TaskSet::new();
        task(&mut tasks, "a", 1, 1, "z");
        let mut nodes = NodePool::new();
        nodes.insert("n1", 2).unwrap();

        let mut planner = Planner::new(tasks, nodes);
        assert_eq!(
            planner.validate(),
            Err(Error::MissingDependency {
                task: "a".to_string(),
                dependency: "z".to_string(),
            })
        );
    }

    #[test]
    fn dependency_cycle_fails_validation() {
        let mut tasks = TaskSet::new();
        task(&mut tasks, "a", 1, 1, "b");
        task(&mut tasks, "b", 1, 1, "a");
        let mut nodes = NodePool::new();
        nodes.insert("n1", 2).unwrap();

        let mut planner = Planner::new(tasks, nodes);
        assert!(matches!(
            planner.validate(),
            Err(Error::CircularDependency { .. })
        ));
    }

    /// Disconnected components all run to completion with consistent
    /// accounting.
    #[test]
    fn disconnected_components_complete_and_conserve_ticks() {
        let mut tasks = TaskSet::new();
        task(&mut tasks, "a", 1, 1, "");
        task(&mut tasks, "b", 1, 1, "");
        task(&mut tasks, "c", 1, 1, "a");
        let mut nodes = NodePool::new();
        nodes.insert("n1", 2).unwrap();

        let mut planner = planner(tasks, nodes);
        planner.schedule();

        for task in planner.tasks().iter() {
            assert_eq!(task.state(), TaskState::Complete);
        }
        let ticks = planner.counters().required_ticks;
        for node in planner.nodes().iter() {
            assert_eq!(node.cores_available(), node.cores_total());
            assert_eq!(
                node.busy_ticks() + node.idle_ticks(),
                node.cores_total() * ticks
            );
        }
        assert_eq!(planner.placements().len(), 3);
    }

    /// Every parent is placed before, and complete by the time of, each
    /// dependent's placement.
    #[test]
    fn parents_always_precede_dependents() {
        let mut tasks = TaskSet::new();
        task(&mut tasks, "fetch", 1, 3, "");
        task(&mut tasks, "build", 2, 4, "fetch");
        task(&mut tasks, "lint", 1, 2, "fetch");
        task(&mut tasks, "test", 2, 2, "build, lint");
        task(&mut tasks, "pack", 1, 1, "build");
        let mut nodes = NodePool::new();
        nodes.insert("n1", 2).unwrap();
        nodes.insert("n2", 4).unwrap();

        let mut planner = planner(tasks, nodes);
        planner.schedule();

        let order: Vec<TaskId> = planner.placements().iter().map(|p| p.task).collect();
        assert_eq!(order.len(), 5);
        for (pos, &id) in order.iter().enumerate() {
            for &parent in planner.tasks().get(id).dependencies() {
                let parent_pos = order.iter().position(|&t| t == parent).unwrap();
                assert!(parent_pos < pos, "parent placed after dependent");
            }
        }
        for task in planner.tasks().iter() {
            assert_eq!(task.state(), TaskState::Complete);
        }
    }

    /// Best-fit: the chosen node has the smallest sufficient availability.
    #[test]
    fn placement_prefers_the_tightest_node() {
        let mut tasks = TaskSet::new();
        task(&mut tasks, "a", 2, 1, "");
        let mut nodes = NodePool::new();
        nodes.insert("wide", 8).unwrap();
        nodes.insert("mid", 4).unwrap();
        nodes.insert("tight", 2).unwrap();

        let mut planner = planner(tasks, nodes);
        planner.schedule();

        assert_eq!(
            placement_names(&planner),
            vec![("a".to_string(), "tight".to_string())]
        );
    }

    /// Nodes too small for the candidate are walked past and counted.
    #[test]
    fn insufficient_nodes_feed_compute_wait() {
        let mut tasks = TaskSet::new();
        task(&mut tasks, "a", 3, 2, "");
        let mut nodes = NodePool::new();
        nodes.insert("small", 1).unwrap();
        nodes.insert("mid", 2).unwrap();
        nodes.insert("big", 4).unwrap();

        let mut planner = planner(tasks, nodes);
        planner.schedule();

        assert_eq!(
            placement_names(&planner),
            vec![("a".to_string(), "big".to_string())]
        );
        assert_eq!(planner.counters().compute_wait, 2);
    }

    /// Identical inputs give identical schedules and counters.
    #[test]
    fn schedule_is_deterministic() {
        let build = || {
            let mut tasks = TaskSet::new();
            task(&mut tasks, "a", 1, 3, "");
            task(&mut tasks, "b", 2, 2, "");
            task(&mut tasks, "c", 1, 4, "a");
            task(&mut tasks, "d", 2, 1, "a, b");
            let mut nodes = NodePool::new();
            nodes.insert("n1", 2).unwrap();
            nodes.insert("n2", 3).unwrap();
            let mut planner = planner(tasks, nodes);
            planner.schedule();
            (placement_names(&planner), planner.counters())
        };

        assert_eq!(build(), build());
    }

    /// An empty task set validates and schedules to an empty plan.
    #[test]
    fn empty_task_set_yields_empty_plan() {
        let mut nodes = NodePool::new();
        nodes.insert("n1", 2).unwrap();
        let mut planner = planner(TaskSet::new(), nodes);
        assert!(planner.schedule().is_empty());
        assert_eq!(planner.counters().required_ticks, 0);
    }

    #[test]
    fn validate_is_idempotent_after_success() {
        let mut tasks = TaskSet::new();
        task(&mut tasks, "a", 1, 1, "");
        let mut nodes = NodePool::new();
        nodes.insert("n1", 1).unwrap();

        let mut planner = Planner::new(tasks, nodes);
        planner.validate().unwrap();
        planner.validate().unwrap();
        assert_eq!(planner.job_sequence(), &[TaskId(0)]);
    }

    #[test]
    #[should_panic(expected = "before validate")]
    fn schedule_before_validate_aborts() {
        let mut nodes = NodePool::new();
        nodes.insert("n1", 1).unwrap();
        Planner::new(TaskSet::new(), nodes).schedule();
    }

    /// The second schedule call does not re-place completed work.
    #[test]
    fn schedule_twice_returns_the_same_plan() {
        let mut tasks = TaskSet::new();
        task(&mut tasks, "a", 1, 2, "");
        let mut nodes = NodePool::new();
        nodes.insert("n1", 1).unwrap();

        let mut planner = planner(tasks, nodes);
        let first = planner.schedule().to_vec();
        let second = planner.schedule().to_vec();
        assert_eq!(first, second);
    }
}
