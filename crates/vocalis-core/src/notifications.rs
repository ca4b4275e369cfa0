//! Transient user-facing notifications.
//!
//! Any component may publish; any number of presenters may subscribe.
//! Publishing never blocks and never fails: with no subscriber attached the
//! notification is simply dropped.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Broadcast channel capacity for notifications.
const CHANNEL_CAPACITY: usize = 64;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// A message plus its severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }
}

/// Fire-and-forget notification channel.
///
/// Cloning is cheap; all clones feed the same subscribers.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: Arc<broadcast::Sender<Notification>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish a notification to all current subscribers.
    pub fn publish(&self, level: NotificationLevel, message: impl Into<String>) {
        let notification = Notification::new(level, message);
        match level {
            NotificationLevel::Error => tracing::warn!(message = %notification.message, "notification"),
            _ => tracing::debug!(%level, message = %notification.message, "notification"),
        }
        if self.sender.receiver_count() > 0 {
            let _ = self.sender.send(notification);
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.publish(NotificationLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.publish(NotificationLevel::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.publish(NotificationLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.publish(NotificationLevel::Error, message);
    }

    /// Subscribe to notifications published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Number of attached presenters.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = NotificationBus::new();
        bus.error("nobody is listening");
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn every_subscriber_receives_each_notification() {
        let bus = NotificationBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.clone().subscribe();

        bus.success("Audio exported");

        let expected = Notification::new(NotificationLevel::Success, "Audio exported");
        assert_eq!(first.recv().await.unwrap(), expected);
        assert_eq!(second.recv().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn levels_are_preserved_in_order() {
        let bus = NotificationBus::new();
        let mut rx = bus.subscribe();

        bus.info("a");
        bus.warning("b");
        bus.error("c");

        let levels: Vec<_> = [
            rx.recv().await.unwrap(),
            rx.recv().await.unwrap(),
            rx.recv().await.unwrap(),
        ]
        .into_iter()
        .map(|n| n.level)
        .collect();
        assert_eq!(
            levels,
            vec![
                NotificationLevel::Info,
                NotificationLevel::Warning,
                NotificationLevel::Error
            ]
        );
    }
}
