//! Connection worker.
//!
//! One task owns the socket, the keep-alive interval, the reconnect timer and
//! the retry counter. It reacts to one event at a time, so updates are
//! merged strictly in arrival order. The execution store lives inside the
//! published snapshot and is merged in place; consumers only read it.

use crate::client::{ConnectionState, SyncSnapshot};
use crate::config::SyncConfig;
use crate::protocol::{Inbound, KEEP_ALIVE_PAYLOAD, decode, endpoint_url};
use execwatch_core::{BackoffPolicy, ClientId, Notifier};
use execwatch_error::{SyncError, SyncErrorKind};
use futures_util::{SinkExt, StreamExt};
use std::pin::Pin;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior, Sleep, interval_at, sleep, timeout};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Error as WsError, Message},
};
use tracing::{debug, error, info, instrument, trace, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Requests sent from the handle to the worker.
#[derive(Debug)]
pub(crate) enum Command {
    /// Open a channel unless one is open or opening
    Connect,
    /// Close the channel and cancel keep-alive and pending reconnects
    Disconnect(oneshot::Sender<()>),
    /// Close everything and stop the worker
    Shutdown(oneshot::Sender<()>),
}

enum Phase {
    Idle,
    Open { ws: WsStream, keep_alive: Interval },
    Waiting { reconnect_at: Pin<Box<Sleep>> },
    Stopped,
}

enum OpenEvent {
    Command(Option<Command>),
    Frame(Option<Result<Message, WsError>>),
    KeepAlive,
}

enum WaitEvent {
    Command(Option<Command>),
    ReconnectDue,
}

enum ConnectEvent<T> {
    Finished(T),
    Command(Option<Command>),
}

pub(crate) struct SyncWorker<N> {
    config: SyncConfig,
    backoff: BackoffPolicy,
    notifier: N,
    retry: u32,
    commands: mpsc::Receiver<Command>,
    snapshot: watch::Sender<SyncSnapshot>,
}

impl<N: Notifier> SyncWorker<N> {
    pub(crate) fn new(
        config: SyncConfig,
        notifier: N,
        commands: mpsc::Receiver<Command>,
        snapshot: watch::Sender<SyncSnapshot>,
    ) -> Self {
        Self {
            backoff: config.backoff(),
            config,
            notifier,
            retry: 0,
            commands,
            snapshot,
        }
    }

    /// Runs the worker until shutdown or until every handle is dropped.
    #[instrument(name = "sync_worker", skip(self), fields(server_url = %self.config.server_url()))]
    pub(crate) async fn run(mut self) {
        info!("Sync worker started");

        let mut phase = Phase::Idle;
        loop {
            phase = match phase {
                Phase::Idle => self.idle().await,
                Phase::Open { ws, keep_alive } => self.open(ws, keep_alive).await,
                Phase::Waiting { reconnect_at } => self.waiting(reconnect_at).await,
                Phase::Stopped => break,
            };
        }

        self.set_state(ConnectionState::Disconnected);
        info!("Sync worker stopped");
    }

    async fn idle(&mut self) -> Phase {
        match self.commands.recv().await {
            Some(Command::Connect) => {
                self.retry = 0;
                self.connect().await
            }
            Some(Command::Disconnect(ack)) => {
                debug!("Disconnect requested while idle");
                self.set_state(ConnectionState::Disconnected);
                let _ = ack.send(());
                Phase::Idle
            }
            Some(Command::Shutdown(ack)) => {
                let _ = ack.send(());
                Phase::Stopped
            }
            None => Phase::Stopped,
        }
    }

    async fn open(&mut self, mut ws: WsStream, mut keep_alive: Interval) -> Phase {
        let event = tokio::select! {
            command = self.commands.recv() => OpenEvent::Command(command),
            frame = ws.next() => OpenEvent::Frame(frame),
            _ = keep_alive.tick() => OpenEvent::KeepAlive,
        };

        match event {
            OpenEvent::Command(Some(Command::Connect)) => {
                trace!("Already connected");
                Phase::Open { ws, keep_alive }
            }
            OpenEvent::Command(Some(Command::Disconnect(ack))) => {
                close(ws).await;
                self.retry = 0;
                self.set_state(ConnectionState::Disconnected);
                let _ = ack.send(());
                Phase::Idle
            }
            OpenEvent::Command(Some(Command::Shutdown(ack))) => {
                close(ws).await;
                let _ = ack.send(());
                Phase::Stopped
            }
            OpenEvent::Command(None) => {
                close(ws).await;
                Phase::Stopped
            }
            OpenEvent::Frame(Some(Ok(Message::Text(text)))) => {
                self.handle_text(text.as_str());
                Phase::Open { ws, keep_alive }
            }
            OpenEvent::Frame(Some(Ok(Message::Close(frame)))) => {
                info!(?frame, "Server closed the connection");
                self.schedule_reconnect()
            }
            OpenEvent::Frame(Some(Ok(_))) => Phase::Open { ws, keep_alive },
            OpenEvent::Frame(Some(Err(e))) => {
                self.transport_failure(SyncError::new(SyncErrorKind::Receive(e.to_string())))
            }
            OpenEvent::Frame(None) => {
                info!("WebSocket stream ended");
                self.schedule_reconnect()
            }
            OpenEvent::KeepAlive => {
                trace!("Sending keep-alive");
                match ws
                    .send(Message::Text(KEEP_ALIVE_PAYLOAD.to_string().into()))
                    .await
                {
                    Ok(()) => Phase::Open { ws, keep_alive },
                    Err(e) => {
                        self.transport_failure(SyncError::new(SyncErrorKind::Send(e.to_string())))
                    }
                }
            }
        }
    }

    async fn waiting(&mut self, mut reconnect_at: Pin<Box<Sleep>>) -> Phase {
        let event = tokio::select! {
            command = self.commands.recv() => WaitEvent::Command(command),
            _ = &mut reconnect_at => WaitEvent::ReconnectDue,
        };

        match event {
            WaitEvent::Command(Some(Command::Connect)) => {
                trace!("Reconnect already scheduled");
                Phase::Waiting { reconnect_at }
            }
            WaitEvent::Command(Some(Command::Disconnect(ack))) => {
                debug!("Cancelling scheduled reconnect");
                self.retry = 0;
                self.set_state(ConnectionState::Disconnected);
                let _ = ack.send(());
                Phase::Idle
            }
            WaitEvent::Command(Some(Command::Shutdown(ack))) => {
                let _ = ack.send(());
                Phase::Stopped
            }
            WaitEvent::Command(None) => Phase::Stopped,
            WaitEvent::ReconnectDue => {
                self.retry += 1;
                self.connect().await
            }
        }
    }

    /// Attempt to open a channel with a fresh client id.
    #[instrument(skip(self), fields(attempt = self.retry))]
    async fn connect(&mut self) -> Phase {
        let client_id = ClientId::generate();
        let url = endpoint_url(self.config.server_url(), &client_id);
        self.set_state(ConnectionState::Connecting {
            attempt: self.retry,
        });
        debug!(client_id = %client_id, "Opening WebSocket");

        let connecting = timeout(self.config.connect_timeout(), connect_async(url.as_str()));
        tokio::pin!(connecting);

        let result = loop {
            let event = tokio::select! {
                result = &mut connecting => ConnectEvent::Finished(result),
                command = self.commands.recv() => ConnectEvent::Command(command),
            };

            match event {
                ConnectEvent::Finished(result) => break result,
                ConnectEvent::Command(Some(Command::Connect)) => continue,
                ConnectEvent::Command(Some(Command::Disconnect(ack))) => {
                    debug!("Connect abandoned by disconnect");
                    self.retry = 0;
                    self.set_state(ConnectionState::Disconnected);
                    let _ = ack.send(());
                    return Phase::Idle;
                }
                ConnectEvent::Command(Some(Command::Shutdown(ack))) => {
                    let _ = ack.send(());
                    return Phase::Stopped;
                }
                ConnectEvent::Command(None) => return Phase::Stopped,
            }
        };

        match result {
            Ok(Ok((ws, _response))) => {
                info!(client_id = %client_id, "WebSocket connected");
                self.retry = 0;
                self.set_state(ConnectionState::Connected { client_id });

                let period = self.config.keep_alive();
                let mut keep_alive = interval_at(Instant::now() + period, period);
                keep_alive.set_missed_tick_behavior(MissedTickBehavior::Delay);
                Phase::Open { ws, keep_alive }
            }
            Ok(Err(e)) => {
                self.transport_failure(SyncError::new(SyncErrorKind::Connect(e.to_string())))
            }
            Err(_) => self.transport_failure(SyncError::new(SyncErrorKind::Connect(format!(
                "timed out after {}s",
                self.config.connect_timeout().as_secs()
            )))),
        }
    }

    /// Route a channel failure: transport errors reconnect, anything else stops.
    fn transport_failure(&mut self, error: SyncError) -> Phase {
        if error.is_retryable() {
            warn!(error = %error, "WebSocket transport failure");
            self.schedule_reconnect()
        } else {
            error!(error = %error, "Unrecoverable sync failure");
            self.retry = 0;
            self.set_state(ConnectionState::Disconnected);
            Phase::Idle
        }
    }

    /// Arm the reconnect timer, or give up once the attempt ceiling is reached.
    fn schedule_reconnect(&mut self) -> Phase {
        if let Some(max) = *self.config.max_reconnect_attempts() {
            if self.retry >= max {
                error!(attempts = self.retry, "Giving up on reconnecting");
                self.set_state(ConnectionState::GaveUp {
                    attempts: self.retry,
                });
                return Phase::Idle;
            }
        }

        let delay = self.backoff.delay(self.retry);
        info!(
            attempt = self.retry + 1,
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );
        self.set_state(ConnectionState::Reconnecting {
            attempt: self.retry + 1,
            delay,
        });
        Phase::Waiting {
            reconnect_at: Box::pin(sleep(delay)),
        }
    }

    fn handle_text(&mut self, text: &str) {
        match decode(text) {
            Ok(Inbound::ExecutionUpdate(update)) => {
                let mut notification = None;
                self.snapshot.send_modify(|snapshot| {
                    notification = snapshot.apply(update).notification();
                });
                if let Some(notification) = notification {
                    debug!(
                        execution_id = notification.execution_id(),
                        level = %notification.level(),
                        "Raising notification"
                    );
                    self.notifier.notify(notification);
                }
            }
            Ok(Inbound::Ignored(kind)) => {
                trace!(message_type = %kind, "Ignoring message");
            }
            Err(e) => {
                warn!(error = %e, "Discarding malformed message");
            }
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        self.snapshot
            .send_modify(|snapshot| snapshot.set_state(state));
    }
}

async fn close(mut ws: WsStream) {
    if let Err(e) = ws.close(None).await {
        debug!(error = %e, "Error closing WebSocket");
    }
}
