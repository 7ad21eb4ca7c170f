//! Command line argument parsing
//!
//! Subcommands:
//! - `run`: Run one execution cycle over the sample workload
//! - `summary`: Print the task summary without running
//! - `show-config`: Print the resolved configuration

use crate::task::StrategyKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "taskflow")]
#[command(author = "Taskflow Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run tasks through sequential, concurrent or priority-ordered strategies")]
#[command(long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one execution cycle
    Run {
        /// Execution strategy (sequential, concurrent, priority)
        #[arg(short = 's', long = "strategy")]
        strategy: Option<StrategyKind>,
        /// Maximum number of task bodies running at once (concurrent strategy)
        #[arg(long = "max-concurrency")]
        max_concurrency: Option<usize>,
        /// Name under which the cycle report is forwarded
        #[arg(long = "report-name")]
        report_name: Option<String>,
    },
    /// Print the task summary without running
    Summary,
    /// Show the resolved configuration
    ShowConfig,
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_accepts_strategy_aliases() {
        let args = Args::try_parse_from(["taskflow", "run", "--strategy", "Parallel"]).unwrap();
        match args.command {
            Commands::Run { strategy, .. } => assert_eq!(strategy, Some(StrategyKind::Concurrent)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        assert!(Args::try_parse_from(["taskflow", "run", "--strategy", "random"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let args =
            Args::try_parse_from(["taskflow", "summary", "--config", "custom.toml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(args.command, Commands::Summary));
    }
}
