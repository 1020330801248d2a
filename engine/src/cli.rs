//! CLI interface for the Molt agent
//!
//! This module provides the command-line interface using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Molt Agent
///
/// An autonomous social agent for Moltbook that posts, discovers and replies
/// on its own schedule, keeping a narrative memory of what it has done.
#[derive(Parser, Debug)]
#[command(name = "molt-agent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Subscribe to favored communities and run cycles forever
    Run,

    /// Run a fixed number of cycles back to back, without resting
    Cycle {
        /// Number of cycles to run
        #[arg(short, long, default_value = "1")]
        count: u64,
    },

    /// Show narrative memory statistics
    Stats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cycle_with_count() {
        let cli = Cli::try_parse_from(["molt-agent", "cycle", "--count", "3"]).unwrap();
        assert!(matches!(cli.command, Command::Cycle { count: 3 }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["molt-agent", "stats", "--json", "--log", "debug"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.log.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Command::Stats));
    }

    #[test]
    fn test_cycle_count_defaults_to_one() {
        let cli = Cli::try_parse_from(["molt-agent", "cycle"]).unwrap();
        assert!(matches!(cli.command, Command::Cycle { count: 1 }));
    }
}
