//! Handle to a running sync client.
//!
//! # Architecture
//!
//! - [`SyncClient`] - cheap control surface held by the application
//! - a worker task - owns the WebSocket, timers and the execution store
//! - [`SyncSnapshot`] - read-only view published after every change
//!
//! # Example
//!
//! ```no_run
//! use execwatch_client::{LogNotifier, SyncClient, SyncConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SyncClient::spawn(SyncConfig::load()?, LogNotifier);
//! client.connect().await?;
//!
//! let mut updates = client.subscribe();
//! while updates.changed().await.is_ok() {
//!     let snapshot = updates.borrow_and_update().clone();
//!     println!("{} running", snapshot.running().len());
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::SyncConfig;
use crate::worker::{Command, SyncWorker};
use derive_getters::Getters;
use execwatch_core::{Applied, ClientId, Execution, ExecutionStore, Notifier};
use execwatch_error::{ExecwatchResult, SyncError, SyncErrorKind};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

const COMMAND_BUFFER: usize = 32;

/// Connection phase as seen by consumers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No channel and nothing scheduled
    #[default]
    Disconnected,
    /// Opening a channel; `attempt` is 0 for the first try
    Connecting {
        /// Reconnect attempt number
        attempt: u32,
    },
    /// Channel open
    Connected {
        /// Identifier sent with this connection
        client_id: ClientId,
    },
    /// Channel lost; a reconnect fires after `delay`
    Reconnecting {
        /// Reconnect attempt about to be made
        attempt: u32,
        /// Wait before that attempt
        delay: Duration,
    },
    /// Reconnect ceiling reached; waiting for an explicit connect
    GaveUp {
        /// Reconnect attempts made
        attempts: u32,
    },
}

impl ConnectionState {
    /// Whether a channel is currently open.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }
}

/// Read-only view of the client's state at one moment.
///
/// The worker merges updates into the published snapshot in place, so a
/// receiver that only borrows it never pays for a copy of the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct SyncSnapshot {
    #[getter(skip)]
    store: ExecutionStore,
    /// Pending and running executions, most relevant first, capped
    running: Vec<Execution>,
    /// Connection phase
    state: ConnectionState,
}

impl SyncSnapshot {
    pub(crate) fn new(store: ExecutionStore) -> Self {
        Self {
            running: store.running(),
            store,
            state: ConnectionState::Disconnected,
        }
    }

    /// Merge one update and refresh the running list.
    pub(crate) fn apply(&mut self, update: Execution) -> Applied {
        let applied = self.store.apply(update);
        self.running = self.store.running();
        applied
    }

    pub(crate) fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    /// Every execution seen this session, keyed by id.
    pub fn executions(&self) -> &BTreeMap<i64, Execution> {
        self.store.records()
    }

    /// Whether a channel is currently open.
    pub fn connected(&self) -> bool {
        self.state.is_connected()
    }
}

/// Control surface for one live connection to the event source.
///
/// Dropping the handle stops the worker and closes the channel.
pub struct SyncClient {
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<SyncSnapshot>,
    worker: JoinHandle<()>,
}

impl SyncClient {
    /// Start the worker task on the current tokio runtime.
    ///
    /// Nothing connects until [`SyncClient::connect`] is called.
    #[instrument(skip_all, fields(server_url = %config.server_url()))]
    pub fn spawn<N>(config: SyncConfig, notifier: N) -> Self
    where
        N: Notifier + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let store = ExecutionStore::with_running_limit(*config.running_limit());
        let (snapshot_tx, snapshot_rx) = watch::channel(SyncSnapshot::new(store));

        let worker = SyncWorker::new(config, notifier, command_rx, snapshot_tx);
        let worker = tokio::spawn(worker.run());

        debug!("Sync client spawned");
        Self {
            commands: command_tx,
            snapshot: snapshot_rx,
            worker,
        }
    }

    /// Open a channel with a fresh client id.
    ///
    /// Returns once the request is queued; watch [`SyncClient::subscribe`] or
    /// [`SyncClient::is_connected`] for the outcome. A no-op while a channel
    /// is open, opening, or waiting to reconnect.
    ///
    /// # Errors
    ///
    /// Returns [`SyncErrorKind::WorkerStopped`] if the worker has ended.
    #[instrument(skip(self))]
    pub async fn connect(&self) -> ExecwatchResult<()> {
        self.commands
            .send(Command::Connect)
            .await
            .map_err(|_| SyncError::new(SyncErrorKind::WorkerStopped))?;
        Ok(())
    }

    /// Close the channel, stop the keep-alive and cancel any pending reconnect.
    ///
    /// Safe to call repeatedly or before any connect. On return the
    /// connectivity flag is false.
    ///
    /// # Errors
    ///
    /// Returns [`SyncErrorKind::WorkerStopped`] if the worker has ended.
    #[instrument(skip(self))]
    pub async fn disconnect(&self) -> ExecwatchResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.commands
            .send(Command::Disconnect(ack_tx))
            .await
            .map_err(|_| SyncError::new(SyncErrorKind::WorkerStopped))?;
        ack_rx
            .await
            .map_err(|_| SyncError::new(SyncErrorKind::WorkerStopped))?;
        Ok(())
    }

    /// Close everything and wait for the worker to finish.
    ///
    /// # Errors
    ///
    /// Returns [`SyncErrorKind::WorkerStopped`] if the worker had already ended.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> ExecwatchResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.commands
            .send(Command::Shutdown(ack_tx))
            .await
            .map_err(|_| SyncError::new(SyncErrorKind::WorkerStopped))?;
        ack_rx
            .await
            .map_err(|_| SyncError::new(SyncErrorKind::WorkerStopped))?;
        self.worker
            .await
            .map_err(|_| SyncError::new(SyncErrorKind::WorkerStopped))?;
        Ok(())
    }

    /// Current state.
    pub fn snapshot(&self) -> SyncSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Every execution seen this session, keyed by id.
    pub fn executions(&self) -> BTreeMap<i64, Execution> {
        self.snapshot.borrow().executions().clone()
    }

    /// Pending and running executions, most relevant first, capped.
    pub fn running(&self) -> Vec<Execution> {
        self.snapshot.borrow().running().clone()
    }

    /// Whether a channel is currently open.
    pub fn is_connected(&self) -> bool {
        self.snapshot.borrow().connected()
    }

    /// Connection phase.
    pub fn state(&self) -> ConnectionState {
        self.snapshot.borrow().state().clone()
    }

    /// Receiver notified after every published change.
    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.snapshot.clone()
    }
}
