//! Configuration error types.

/// What went wrong while producing the client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A configuration layer could not be read or merged
    #[display("Failed to load {}: {}", layer, message)]
    Load {
        /// File path or layer name
        layer: String,
        /// Underlying reason
        message: String,
    },
    /// Merged layers did not deserialize into the settings struct
    #[display("Failed to parse configuration: {}", _0)]
    Parse(String),
    /// A value is outside its allowed range
    #[display("Invalid {}: {}", key, message)]
    Invalid {
        /// Offending setting
        key: &'static str,
        /// Why the value was rejected
        message: String,
    },
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use execwatch_error::ConfigError;
///
/// let err = ConfigError::invalid("keep_alive_secs", "must be greater than zero");
/// assert_eq!(err.key(), Some("keep_alive_secs"));
/// assert!(err.to_string().contains("Invalid keep_alive_secs"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    line: u32,
    file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the current location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// A layer failed to load.
    #[track_caller]
    pub fn load(layer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Load {
            layer: layer.into(),
            message: message.into(),
        })
    }

    /// The merged layers failed to deserialize.
    #[track_caller]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Parse(message.into()))
    }

    /// A setting holds an unusable value.
    #[track_caller]
    pub fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Invalid {
            key,
            message: message.into(),
        })
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }

    /// The rejected setting, for validation failures.
    pub fn key(&self) -> Option<&'static str> {
        match &self.kind {
            ConfigErrorKind::Invalid { key, .. } => Some(key),
            _ => None,
        }
    }
}
