//! Backoff schedule command handler.

use execwatch::{ExecwatchResult, SyncConfig};
use std::path::Path;

/// Print the delay before each reconnect attempt under the loaded configuration.
pub fn print_backoff(attempts: u32, config_path: Option<&Path>) -> ExecwatchResult<()> {
    let config = SyncConfig::load_with_override(config_path)?;
    let schedule = config.backoff().schedule(attempts);

    println!(
        "Reconnect schedule (base {}ms, ceiling {}ms):",
        config.backoff_base_ms(),
        config.backoff_max_ms()
    );
    for (attempt, delay) in schedule.iter().enumerate() {
        println!("  attempt {:>2}: {}ms", attempt + 1, delay.as_millis());
    }
    match config.max_reconnect_attempts() {
        Some(max) => println!("Gives up after {} attempts", max),
        None => println!("Retries forever"),
    }

    Ok(())
}
