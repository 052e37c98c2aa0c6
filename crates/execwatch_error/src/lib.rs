//! Error types for execwatch.
//!
//! This crate provides the foundation error types used throughout the execwatch workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use execwatch_error::{ExecwatchResult, ConfigError};
//!
//! fn load() -> ExecwatchResult<String> {
//!     Err(ConfigError::invalid("server_url", "must not be empty"))?
//! }
//!
//! match load() {
//!     Ok(url) => println!("Got: {}", url),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod json;
mod sync;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::{ConfigError, ConfigErrorKind};
pub use error::{ExecwatchError, ExecwatchErrorKind, ExecwatchResult};
pub use json::JsonError;
pub use sync::{SyncError, SyncErrorKind};
