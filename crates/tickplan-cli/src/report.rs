//! Schedule printout and the `--analyze` report.
//!
//! Builds the output as strings; `main` writes them to stdout. The schedule
//! format is one `<task>: <node>` line per placement under a fixed header,
//! so it stays trivially diffable between runs.

use std::fmt::Write;
use tickplan_core::analysis::{self, Analysis};
use tickplan_core::{Planner, TaskId};

/// The ordered placement listing.
#[must_use]
pub fn schedule_text(planner: &Planner) -> String {
    let mut out = String::from("# task schedule:\n");
    for placement in planner.placements() {
        writeln!(
            out,
            "{}: {}",
            planner.tasks().get(placement.task).name(),
            planner.nodes().get(placement.node).name()
        )
        .unwrap();
    }
    out
}

/// The utilization and dependency analysis report.
#[must_use]
pub fn analysis_text(planner: &Planner) -> String {
    let Analysis {
        totals,
        hot_nodes,
        most_waited_on,
        most_dependencies,
    } = analysis::analyze(planner.tasks(), planner.nodes());
    let counters = planner.counters();
    let mut out = String::new();

    writeln!(out, "== Compute Analyzer ==").unwrap();
    writeln!(out, "Total core count: {}", totals.total_cores).unwrap();
    writeln!(
        out,
        "Total ticks needed (across all cores): {}",
        totals.total_ticks
    )
    .unwrap();
    writeln!(out, "    busy ticks: {}", totals.busy_ticks).unwrap();
    writeln!(out, "    idle ticks: {}", totals.idle_ticks).unwrap();
    writeln!(
        out,
        "Avg. cores per node: {}",
        significant_digits(totals.mean_cores)
    )
    .unwrap();

    if !hot_nodes.is_empty() {
        writeln!(out, "Hot compute nodes:").unwrap();
        for id in hot_nodes {
            let node = planner.nodes().get(id);
            writeln!(
                out,
                "    node: {} ({} cores) ran {} tasks",
                node.name(),
                node.cores_total(),
                node.assign_count()
            )
            .unwrap();
        }
    }

    writeln!(out, "Planner ticks: {}", counters.required_ticks).unwrap();
    writeln!(out, "Task delays").unwrap();
    writeln!(
        out,
        "    not runnable, unmet dependencies: {}",
        counters.dep_wait
    )
    .unwrap();
    writeln!(
        out,
        "    tasks blocked at least once: {}",
        counters.blocked_tasks
    )
    .unwrap();
    writeln!(
        out,
        "    runnable, but waited for compute: {}",
        counters.compute_wait
    )
    .unwrap();
    writeln!(
        out,
        "Schedulings when all cores were busy: {}",
        counters.all_cores_busy
    )
    .unwrap();

    writeln!(out, "== Task analysis ==").unwrap();
    if !most_waited_on.is_empty() {
        writeln!(out, "Most waited on tasks:").unwrap();
        for id in most_waited_on {
            let task = planner.tasks().get(id);
            writeln!(
                out,
                "    {}: {} waiters ({})",
                task.name(),
                task.waiter_count(),
                name_list(planner, task.waiters())
            )
            .unwrap();
        }
    }
    if !most_dependencies.is_empty() {
        writeln!(out, "Tasks with the most dependencies:").unwrap();
        for id in most_dependencies {
            let task = planner.tasks().get(id);
            writeln!(
                out,
                "    {}: {} dependencies ({})",
                task.name(),
                task.dependency_count().unwrap_or(0),
                name_list(planner, task.dependencies())
            )
            .unwrap();
        }
    }

    out
}

fn name_list(planner: &Planner, ids: &[TaskId]) -> String {
    ids.iter()
        .map(|&id| planner.tasks().get(id).name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format with four significant digits, trailing zeros trimmed.
fn significant_digits(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (3 - magnitude).max(0) as usize;
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickplan_core::{NodePool, TaskSet};

    fn planned() -> Planner {
        let mut tasks = TaskSet::new();
        tasks.insert("a", 1, 2).unwrap();
        let b = tasks.insert("b", 1, 3).unwrap();
        tasks.get_mut(b).set_dep_spec("a");
        let mut nodes = NodePool::new();
        nodes.insert("n1", 4).unwrap();

        let mut planner = Planner::new(tasks, nodes);
        planner.validate().unwrap();
        planner.schedule();
        planner
    }

    #[test]
    fn schedule_lists_placements_in_order() {
        let planner = planned();
        assert_eq!(schedule_text(&planner), "# task schedule:\na: n1\nb: n1\n");
    }

    #[test]
    fn analysis_reports_totals_and_rankings() {
        let planner = planned();
        let text = analysis_text(&planner);

        assert!(text.contains("== Compute Analyzer =="));
        assert!(text.contains("Total core count: 4"));
        assert!(text.contains("Planner ticks: 5"));
        assert!(text.contains("Avg. cores per node: 4"));
        assert!(text.contains("node: n1 (4 cores) ran 2 tasks"));
        assert!(text.contains("a: 1 waiters (b)"));
        assert!(text.contains("b: 1 dependencies (a)"));
    }

    #[test]
    fn significant_digits_trims_like_stream_precision() {
        assert_eq!(significant_digits(0.0), "0");
        assert_eq!(significant_digits(4.0), "4");
        assert_eq!(significant_digits(2.5), "2.5");
        assert_eq!(significant_digits(10.0 / 3.0), "3.333");
        assert_eq!(significant_digits(12.346), "12.35");
        assert_eq!(significant_digits(1234.6), "1235");
    }
}
