//! JSON encoding error types.

/// A value could not be encoded as JSON for output.
///
/// # Examples
///
/// ```
/// use execwatch_error::JsonError;
///
/// let err = JsonError::new("notification", "key must be a string");
/// assert_eq!(err.subject(), "notification");
/// assert!(err.to_string().contains("Failed to encode notification"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: Failed to encode {}: {} at line {} in {}", subject, message, line, file)]
pub struct JsonError {
    subject: &'static str,
    message: String,
    line: u32,
    file: &'static str,
}

impl JsonError {
    /// Create a new JsonError for `subject` at the current location.
    #[track_caller]
    pub fn new(subject: &'static str, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            subject,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// What was being encoded.
    pub fn subject(&self) -> &'static str {
        self.subject
    }

    /// Underlying serializer message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
