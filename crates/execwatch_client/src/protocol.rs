//! Wire format spoken with the event source.
//!
//! Every inbound frame is a JSON envelope with a `type` discriminator and a
//! `data` payload. Only `execution_update` is interpreted; its payload is a
//! partial [`Execution`].

use execwatch_core::{ClientId, Execution};
use execwatch_error::{SyncError, SyncErrorKind};
use serde::{Deserialize, Serialize};

/// Text frame sent on every keep-alive tick.
pub const KEEP_ALIVE_PAYLOAD: &str = "ping";

/// Envelope discriminator for execution updates.
pub const EXECUTION_UPDATE: &str = "execution_update";

/// Query parameter carrying the per-connection client id.
pub const CLIENT_ID_PARAM: &str = "client_id";

/// Raw message envelope.
///
/// # Examples
///
/// ```
/// use execwatch_client::Envelope;
/// use execwatch_core::{Execution, ExecutionStatus};
///
/// let update = Execution { id: 3, status: Some(ExecutionStatus::Running), ..Default::default() };
/// let json = Envelope::execution_update(&update)?.to_json()?;
/// assert!(json.contains("\"type\":\"execution_update\""));
/// # Ok::<(), execwatch_error::SyncError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message kind
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific payload
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    /// Wrap an execution update.
    ///
    /// # Errors
    ///
    /// Returns [`SyncErrorKind::InvalidMessage`] if the record cannot be
    /// converted to a JSON value.
    pub fn execution_update(update: &Execution) -> Result<Self, SyncError> {
        let data = serde_json::to_value(update)
            .map_err(|e| SyncError::new(SyncErrorKind::InvalidMessage(e.to_string())))?;
        Ok(Self {
            kind: EXECUTION_UPDATE.to_string(),
            data,
        })
    }

    /// Serialize to a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized.
    pub fn to_json(&self) -> Result<String, SyncError> {
        serde_json::to_string(self)
            .map_err(|e| SyncError::new(SyncErrorKind::InvalidMessage(e.to_string())))
    }
}

/// An inbound frame after interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Partial execution record to merge
    ExecutionUpdate(Execution),
    /// Well-formed message of a kind this client does not handle
    Ignored(String),
}

/// Interpret one inbound text frame.
///
/// # Errors
///
/// Returns [`SyncErrorKind::InvalidMessage`] when the frame is not a JSON
/// envelope, or when an execution update lacks a valid payload.
///
/// # Examples
///
/// ```
/// use execwatch_client::{Inbound, decode};
///
/// let frame = r#"{"type":"execution_update","data":{"id":2,"status":"pending"}}"#;
/// assert!(matches!(decode(frame), Ok(Inbound::ExecutionUpdate(_))));
///
/// assert!(matches!(decode(r#"{"type":"presence"}"#), Ok(Inbound::Ignored(_))));
/// assert!(decode("not json").is_err());
/// ```
pub fn decode(text: &str) -> Result<Inbound, SyncError> {
    let envelope: Envelope = serde_json::from_str(text).map_err(|e| {
        SyncError::new(SyncErrorKind::InvalidMessage(format!(
            "Parse error: {}",
            e
        )))
    })?;

    if envelope.kind != EXECUTION_UPDATE {
        return Ok(Inbound::Ignored(envelope.kind));
    }

    let update: Execution = serde_json::from_value(envelope.data).map_err(|e| {
        SyncError::new(SyncErrorKind::InvalidMessage(format!(
            "Invalid execution update: {}",
            e
        )))
    })?;

    Ok(Inbound::ExecutionUpdate(update))
}

/// Endpoint for one connection attempt: the base URL plus the client id query.
pub fn endpoint_url(server_url: &str, client_id: &ClientId) -> String {
    let separator = if server_url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", server_url, separator, CLIENT_ID_PARAM, client_id)
}
