//! Core data types for the execwatch execution sync client.
//!
//! This crate holds everything that does not touch the network: the execution
//! record and its merge rules, the local keyed store, reconnect backoff, client
//! identifiers and the notifications raised on terminal transitions.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backoff;
mod client_id;
mod execution;
mod notification;
mod store;

pub use backoff::BackoffPolicy;
pub use client_id::ClientId;
pub use execution::{Execution, ExecutionKind, ExecutionStatus};
pub use notification::{Notification, NotificationLevel, Notifier, UNKNOWN_ERROR};
pub use store::{Applied, DEFAULT_RUNNING_LIMIT, ExecutionStore};
