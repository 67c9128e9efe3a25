//! CLI error types with miette diagnostics.
//!
//! Parse problems and planner validation failures both land here; the main
//! entry point renders them and maps every failure to exit code 1, per the
//! tool's contract (these are configuration errors, never retried).

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// CLI-facing error type.
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("failed to read {kind} file {}", path.display())]
    #[diagnostic(
        code(tickplan::cli::file_error),
        help("check that the path exists and is readable")
    )]
    FileRead {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse of {kind} file {} failed", path.display())]
    #[diagnostic(
        code(tickplan::cli::parse_error),
        help("check the YAML structure against the documented input format")
    )]
    Parse {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid {kind} input in {}: {source}", path.display())]
    #[diagnostic(code(tickplan::cli::invalid_input))]
    InvalidInput {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: tickplan_core::Error,
    },

    #[error("planner failed: {0}")]
    #[diagnostic(
        code(tickplan::cli::plan_error),
        help("fix the task and compute descriptions and rerun")
    )]
    Plan(#[from] tickplan_core::Error),
}

/// Map an error to the process exit code.
pub fn exit_code_for(_err: &CliError) -> i32 {
    EXIT_FAILURE
}

/// Render an error to stderr with its diagnostic context.
pub fn render_error(err: CliError) {
    eprintln!("{:?}", miette::Report::new(err));
}
