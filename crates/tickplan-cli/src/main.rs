//! tickplan CLI — plans the execution of interdependent compute tasks
//! across a pool of multi-core nodes.
//!
//! Reads the two YAML descriptions, validates them, simulates execution,
//! and prints the resulting schedule (plus utilization analysis with
//! `--analyze`). Exit code 0 on success, 1 on any parse or validation
//! failure.

mod cli;
mod errors;
mod input;
mod report;
mod trace;

use crate::cli::Cli;
use crate::errors::{CliError, EXIT_FAILURE, EXIT_OK, exit_code_for, render_error};
use tickplan_core::Planner;

fn main() {
    let cli = cli::parse();

    if let Err(err) = trace::init(cli.level) {
        eprintln!("{err}");
        std::process::exit(EXIT_FAILURE);
    }

    let code = match run(&cli) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            let code = exit_code_for(&err);
            render_error(err);
            code
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.verbose {
        println!("Using compute file {}.", cli.compute.display());
    }
    let nodes = input::read_compute_file(&cli.compute)?;
    if cli.verbose {
        println!("Compute Resources:");
        for node in nodes.iter() {
            println!("    {node}");
        }
    }

    if cli.verbose {
        println!("Using tasks file {}.", cli.tasks.display());
    }
    let tasks = input::read_tasks_file(&cli.tasks)?;
    if cli.verbose {
        println!("Tasks:");
        for task in tasks.iter() {
            println!("    {task}");
        }
    }

    let mut planner = Planner::new(tasks, nodes);
    planner.validate()?;
    planner.schedule();

    print!("{}", report::schedule_text(&planner));
    if cli.analyze {
        print!("{}", report::analysis_text(&planner));
    }
    Ok(())
}
