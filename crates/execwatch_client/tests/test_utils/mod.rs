//! Shared helpers for sync client integration tests.

#![allow(dead_code)]

use execwatch_client::{Envelope, SyncClient, SyncConfig, SyncSnapshot};
use execwatch_core::Execution;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::{WebSocketStream, accept_hdr_async};

/// Upper bound on any single wait in these tests.
pub const WAIT: Duration = Duration::from_secs(5);

/// Local WebSocket event source.
pub struct TestServer {
    pub url: String,
    accepted: mpsc::UnboundedReceiver<Accepted>,
}

/// One accepted client connection.
pub struct Accepted {
    /// Request URI including the query string
    pub uri: String,
    pub ws: WebSocketStream<TcpStream>,
}

impl TestServer {
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_on("127.0.0.1:0".parse()?).await
    }

    /// Listen on a specific address, e.g. one a client is already retrying.
    pub async fn start_on(addr: SocketAddr) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let (uri_tx, uri_rx) = oneshot::channel();
                let callback =
                    move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                        let _ = uri_tx.send(req.uri().to_string());
                        Ok(resp)
                    };

                let Ok(ws) = accept_hdr_async(stream, callback).await else {
                    continue;
                };
                let uri = uri_rx.await.unwrap_or_default();
                if tx.send(Accepted { uri, ws }).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            url: format!("ws://{}/ws", addr),
            accepted: rx,
        })
    }

    /// Wait for the next client connection.
    pub async fn accept(&mut self) -> Accepted {
        timeout(WAIT, self.accepted.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("test server stopped")
    }

    /// A connection that has already arrived, if any.
    pub fn try_accept(&mut self) -> Option<Accepted> {
        self.accepted.try_recv().ok()
    }
}

impl Accepted {
    /// Value of the `client_id` query parameter.
    pub fn client_id(&self) -> Option<&str> {
        self.uri
            .split_once('?')?
            .1
            .split('&')
            .find_map(|pair| pair.strip_prefix("client_id="))
    }

    pub async fn send_text(&mut self, text: &str) {
        self.ws
            .send(Message::Text(text.to_string().into()))
            .await
            .expect("failed to send frame");
    }

    pub async fn send_update(&mut self, update: &Execution) {
        let json = Envelope::execution_update(update)
            .and_then(|envelope| envelope.to_json())
            .expect("failed to encode update");
        self.send_text(&json).await;
    }

    /// Next text frame from the client, or `None` once the client has closed.
    pub async fn next_text(&mut self) -> Option<String> {
        loop {
            let frame = timeout(WAIT, self.ws.next())
                .await
                .expect("timed out waiting for a frame");
            match frame {
                Some(Ok(Message::Text(text))) => return Some(text.as_str().to_string()),
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return None,
                Some(Ok(_)) => continue,
            }
        }
    }
}

/// A local address with nothing listening on it.
pub async fn unreachable_addr() -> anyhow::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// URL of a port with nothing listening on it.
pub async fn unreachable_url() -> anyhow::Result<String> {
    Ok(format!("ws://{}/ws", unreachable_addr().await?))
}

/// Config with short reconnect delays for tests.
pub fn fast_config(url: &str) -> SyncConfig {
    SyncConfig::builder()
        .server_url(url)
        .backoff_base_ms(20)
        .backoff_max_ms(100)
        .connect_timeout_secs(2)
        .build()
        .expect("valid test config")
}

/// Wait until a published snapshot satisfies `predicate`.
pub async fn wait_for(
    client: &SyncClient,
    predicate: impl FnMut(&SyncSnapshot) -> bool,
) -> SyncSnapshot {
    let mut updates = client.subscribe();
    let snapshot = timeout(WAIT, updates.wait_for(predicate))
        .await
        .expect("timed out waiting for snapshot")
        .expect("sync worker stopped")
        .clone();
    snapshot
}
