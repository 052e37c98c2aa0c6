//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Execwatch - live view of remote workflow and agent executions
#[derive(Parser, Debug)]
#[command(name = "execwatch")]
#[command(about = "Live view of remote workflow and agent executions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect to the event source and report executions until interrupted
    Watch {
        /// Event source URL, overriding configuration
        #[arg(long)]
        url: Option<String>,

        /// Configuration file layered above the user files
        #[arg(long)]
        config: Option<PathBuf>,

        /// Reconnect attempts before giving up
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Print the reconnect delay schedule
    Backoff {
        /// Number of attempts to show
        #[arg(long, default_value = "8")]
        attempts: u32,

        /// Configuration file layered above the user files
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Output format for watch reports
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// One JSON object per line
    Json,
}
