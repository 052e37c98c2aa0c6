//! Notification sinks.

use execwatch_core::{Notification, NotificationLevel, Notifier};
use tokio::sync::mpsc;
use tracing::{info, trace, warn};

/// Emits notifications as log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level() {
            NotificationLevel::Success => info!(
                execution_id = notification.execution_id(),
                detail = %notification.detail(),
                "{}",
                notification.title()
            ),
            NotificationLevel::Error => warn!(
                execution_id = notification.execution_id(),
                detail = %notification.detail(),
                "{}",
                notification.title()
            ),
        }
    }
}

/// Forwards notifications to an async consumer.
///
/// # Example
///
/// ```
/// use execwatch_client::ChannelNotifier;
/// use execwatch_core::{Notification, Notifier};
///
/// let (notifier, mut rx) = ChannelNotifier::new();
/// notifier.notify(Notification::success(1, "Workflow completed", "Execution #1 finished successfully"));
/// assert_eq!(rx.try_recv().unwrap().title(), "Workflow completed");
/// ```
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver its notifications arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            trace!("Notification receiver dropped");
        }
    }
}
