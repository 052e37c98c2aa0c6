//! Builder-related errors.

/// Why a builder could not produce its value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BuilderErrorKind {
    /// A field without a default was never set
    #[display("Missing required field: {}", _0)]
    MissingField(&'static str),

    /// A builder-level validator rejected the fields
    #[display("Validation failed: {}", _0)]
    ValidationFailed(String),
}

/// Builder error naming the builder that failed.
///
/// # Examples
///
/// ```
/// use execwatch_error::{BuilderError, BuilderErrorKind};
///
/// let err = BuilderError::new("SyncConfig", BuilderErrorKind::MissingField("server_url"));
/// assert_eq!(err.builder(), "SyncConfig");
/// assert!(err.to_string().contains("server_url"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Builder Error: {} for {} at line {} in {}", kind, builder, line, file)]
pub struct BuilderError {
    builder: &'static str,
    kind: BuilderErrorKind,
    line: u32,
    file: &'static str,
}

impl BuilderError {
    /// Create a new builder error with caller location tracking.
    #[track_caller]
    pub fn new(builder: &'static str, kind: BuilderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            builder,
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Name of the type being built.
    pub fn builder(&self) -> &'static str {
        self.builder
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BuilderErrorKind {
        &self.kind
    }
}
