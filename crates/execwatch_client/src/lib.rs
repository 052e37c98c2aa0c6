//! WebSocket client keeping a live view of remote executions.
//!
//! The client connects to an event source, merges `execution_update`
//! messages into a local store, reconnects with capped exponential backoff
//! when the channel drops, and raises notifications when an execution
//! succeeds or fails.
//!
//! - [`SyncClient`] - control handle and snapshot access
//! - [`SyncConfig`] - layered configuration
//! - [`LogNotifier`] / [`ChannelNotifier`] - notification sinks
//! - [`decode`] / [`Envelope`] - wire format

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod notifier;
mod protocol;
mod worker;

pub use client::{ConnectionState, SyncClient, SyncSnapshot};
pub use config::{MAX_BACKOFF_MS, MAX_PERIOD_SECS, SyncConfig, SyncConfigBuilder};
pub use notifier::{ChannelNotifier, LogNotifier};
pub use protocol::{
    CLIENT_ID_PARAM, EXECUTION_UPDATE, Envelope, Inbound, KEEP_ALIVE_PAYLOAD, decode,
    endpoint_url,
};
