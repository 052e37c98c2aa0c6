//! User-facing notifications raised on terminal transitions.

use crate::{Execution, ExecutionKind, ExecutionStatus};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Detail used when a failed execution carries no error message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Tone of a notification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum NotificationLevel {
    /// Positive outcome
    Success,
    /// Negative outcome
    Error,
}

/// A toast-style message for the end user.
///
/// # Examples
///
/// ```
/// use execwatch_core::{Execution, ExecutionKind, ExecutionStatus, Notification, NotificationLevel};
///
/// let record = Execution {
///     id: 42,
///     kind: Some(ExecutionKind::AgentTest),
///     status: Some(ExecutionStatus::Succeeded),
///     ..Default::default()
/// };
///
/// let note = Notification::for_transition(Some(ExecutionStatus::Running), &record).unwrap();
/// assert_eq!(*note.level(), NotificationLevel::Success);
/// assert_eq!(note.title(), "Agent run completed");
/// assert!(note.detail().contains("#42"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Notification {
    /// Tone of the notification
    level: NotificationLevel,
    /// Short headline
    title: String,
    /// Longer description
    detail: String,
    /// Execution that triggered the notification
    execution_id: i64,
}

impl Notification {
    /// Create a success notification.
    pub fn success(execution_id: i64, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            detail: detail.into(),
            execution_id,
        }
    }

    /// Create an error notification.
    pub fn error(execution_id: i64, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            detail: detail.into(),
            execution_id,
        }
    }

    /// Build the notification for a status change, if one is warranted.
    ///
    /// Only a change into `Succeeded` or `Failed` produces a notification.
    /// `previous` is the status an already-known record held before the
    /// update; `None` means that record had no status yet.
    pub fn for_transition(
        previous: Option<ExecutionStatus>,
        current: &Execution,
    ) -> Option<Self> {
        let status = current.status?;
        if previous == Some(status) {
            return None;
        }

        let label = current.kind.unwrap_or(ExecutionKind::Workflow).label();
        match status {
            ExecutionStatus::Succeeded => Some(Self::success(
                current.id,
                format!("{} completed", label),
                format!("Execution #{} finished successfully", current.id),
            )),
            ExecutionStatus::Failed => Some(Self::error(
                current.id,
                format!("{} failed", label),
                current
                    .error_message
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            )),
            _ => None,
        }
    }
}

/// Fire-and-forget sink for notifications.
///
/// Implementations must not block; queuing and display belong to the sink.
pub trait Notifier: Send + Sync {
    /// Deliver a notification.
    fn notify(&self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}
