//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the execwatch binary.

mod backoff;
mod commands;
mod watch;

pub use backoff::print_backoff;
pub use commands::{Cli, Commands, OutputFormat};
pub use watch::watch;
