//! Sync client error types.

/// Sync client error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum SyncErrorKind {
    /// WebSocket connection could not be opened
    #[display("WebSocket connection failed: {}", _0)]
    Connect(String),
    /// Frame could not be written to the channel
    #[display("WebSocket send failed: {}", _0)]
    Send(String),
    /// Channel reported an error while reading
    #[display("WebSocket receive failed: {}", _0)]
    Receive(String),
    /// Inbound payload could not be interpreted
    #[display("Invalid server message: {}", _0)]
    InvalidMessage(String),
    /// Connection worker is no longer running
    #[display("Sync worker stopped")]
    WorkerStopped,
}

impl SyncErrorKind {
    /// Check if this error is a transport failure the reconnect loop recovers from.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncErrorKind::Connect(_) | SyncErrorKind::Send(_) | SyncErrorKind::Receive(_)
        )
    }
}

/// Sync client error with source location tracking.
///
/// # Examples
///
/// ```
/// use execwatch_error::{SyncError, SyncErrorKind};
///
/// let err = SyncError::new(SyncErrorKind::Connect("connection refused".to_string()));
/// assert!(err.is_retryable());
/// assert!(format!("{}", err).contains("connection refused"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Sync Error: {} at line {} in {}", kind, line, file)]
pub struct SyncError {
    /// The kind of error that occurred
    pub kind: SyncErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SyncError {
    /// Create a new SyncError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SyncErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether the reconnect loop treats this error as transient.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
