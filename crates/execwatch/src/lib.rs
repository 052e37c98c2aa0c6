//! Execwatch - live view of remote workflow and agent executions
//!
//! Execwatch keeps a WebSocket channel open to an event source, merges the
//! partial execution updates it pushes into a local view, and raises a
//! notification whenever a known execution finishes.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use execwatch::{LogNotifier, SyncClient, SyncConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SyncConfig::builder()
//!         .server_url("ws://localhost:8000/ws")
//!         .build()?;
//!
//!     let client = SyncClient::spawn(config, LogNotifier);
//!     client.connect().await?;
//!
//!     for execution in client.running() {
//!         println!("#{} {:?}", execution.id, execution.status);
//!     }
//!     client.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `observability` - export tracing spans through OpenTelemetry (stdout exporter)
//!
//! # Architecture
//!
//! - `execwatch-error` - Error types
//! - `execwatch-core` - Execution records, merge store, notifications, backoff
//! - `execwatch-client` - Configuration, wire protocol and the sync client
//!
//! This crate (`execwatch`) re-exports everything for convenience.

pub use execwatch_client::*;
pub use execwatch_core::*;
pub use execwatch_error::*;

pub mod observability;
