use crate::trace::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tickplan")]
#[command(
    about = "Plans the execution of interdependent compute tasks across a pool of multi-core nodes"
)]
#[command(version)]
pub struct Cli {
    /// Name of the task description file.
    #[arg(long, default_value = "tasks.yaml")]
    pub tasks: PathBuf,

    /// Name of the compute description file.
    #[arg(long, default_value = "compute.yaml")]
    pub compute: PathBuf,

    /// Analyze compute utilization and task dependencies.
    #[arg(long)]
    pub analyze: bool,

    /// Print details of task and compute input.
    #[arg(long)]
    pub verbose: bool,

    #[arg(
        short = 'l',
        long,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_conventional_file_names() {
        let cli = Cli::try_parse_from(["tickplan"]).unwrap();
        assert_eq!(cli.tasks, PathBuf::from("tasks.yaml"));
        assert_eq!(cli.compute, PathBuf::from("compute.yaml"));
        assert!(!cli.analyze);
        assert!(!cli.verbose);
        assert!(matches!(cli.level, LogLevel::Warn));
    }

    #[test]
    fn flags_are_parsed() {
        let cli = Cli::try_parse_from([
            "tickplan",
            "--tasks",
            "jobs.yaml",
            "--compute",
            "pool.yaml",
            "--analyze",
            "--verbose",
            "--level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.tasks, PathBuf::from("jobs.yaml"));
        assert_eq!(cli.compute, PathBuf::from("pool.yaml"));
        assert!(cli.analyze);
        assert!(cli.verbose);
        assert!(matches!(cli.level, LogLevel::Debug));
    }

    #[test]
    fn unknown_level_is_rejected() {
        assert!(Cli::try_parse_from(["tickplan", "--level", "shouty"]).is_err());
    }

    #[test]
    fn help_flag_displays_help() {
        let err = Cli::try_parse_from(["tickplan", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
