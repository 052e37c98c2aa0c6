//! Top-level error wrapper types.

use crate::{BuilderError, ConfigError, JsonError, SyncError};

/// Every error condition the execwatch crates can report.
///
/// # Examples
///
/// ```
/// use execwatch_error::{ExecwatchError, JsonError};
///
/// let json_err = JsonError::new("snapshot", "expected value");
/// let err: ExecwatchError = json_err.into();
/// assert!(format!("{}", err).contains("JSON Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ExecwatchErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Sync client error
    #[from(SyncError)]
    Sync(SyncError),
}

/// Execwatch error with kind discrimination.
///
/// # Examples
///
/// ```
/// use execwatch_error::{ExecwatchError, ExecwatchErrorKind, ExecwatchResult, ConfigError};
///
/// fn might_fail() -> ExecwatchResult<()> {
///     Err(ConfigError::parse("missing field `server_url`"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), ExecwatchErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Execwatch Error: {}", _0)]
pub struct ExecwatchError(Box<ExecwatchErrorKind>);

impl ExecwatchError {
    /// Create a new error from a kind.
    pub fn new(kind: ExecwatchErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ExecwatchErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to ExecwatchErrorKind
impl<T> From<T> for ExecwatchError
where
    T: Into<ExecwatchErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for execwatch operations.
pub type ExecwatchResult<T> = std::result::Result<T, ExecwatchError>;
