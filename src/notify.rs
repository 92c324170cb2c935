//! User-visible notification side channel
//!
//! Mutation and fetch outcomes are reported here, never through return
//! values; the UI host decides how to present them (toasts, banners).

use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification {
            level: NotifyLevel::Success,
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.notify(Notification {
            level: NotifyLevel::Error,
            message: message.to_string(),
        });
    }
}

/// Notifier that only logs; useful for headless hosts and tests
#[derive(Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotifyLevel::Success => info!("{}", notification.message),
            NotifyLevel::Error => warn!("{}", notification.message),
        }
    }
}

/// Notifier that fans notifications out to UI subscribers
pub struct ChannelNotifier {
    tx: broadcast::Sender<Notification>,
}

impl ChannelNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // No subscribers is fine; notifications are fire-and-forget
        let _ = self.tx.send(notification);
    }
}
