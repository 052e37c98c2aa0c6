//! Execwatch CLI binary.
//!
//! This binary provides command-line access to the sync client:
//! - Watch an event source and report finished and running executions
//! - Inspect the reconnect delay schedule

use clap::Parser;
use execwatch::observability::{
    ObservabilityConfig, init_observability_with_config, shutdown_observability,
};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, print_backoff, watch};

    // Pick up EXECWATCH_* overrides from a local .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    init_observability_with_config(
        ObservabilityConfig::new("execwatch")
            .with_log_level(log_level)
            .with_json_logs(cli.json_logs),
    )?;

    let result = match cli.command {
        Commands::Watch {
            url,
            config,
            max_attempts,
            format,
        } => watch(url, config.as_deref(), max_attempts, format).await,
        Commands::Backoff { attempts, config } => print_backoff(attempts, config.as_deref()),
    };

    shutdown_observability();
    result?;
    Ok(())
}
