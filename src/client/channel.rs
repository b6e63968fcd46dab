//! Cross-context change notification.
//!
//! Events only say "something changed, re-read the cookies". They carry no
//! identity, so a receiver can never be told who is logged in; it has to look.

use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, trace};
use uuid::Uuid;

const DEFAULT_CAPACITY: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncKind {
    SignedIn,
    SignedOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncEvent {
    /// Browsing context that caused the change.
    pub origin: Uuid,
    pub kind: SyncKind,
}

pub type SyncHandler = Box<dyn Fn(SyncEvent) + Send + Sync + 'static>;

/// Publish/subscribe seam between browsing contexts of one browser.
pub trait SyncChannel: Send + Sync {
    /// Best effort; nobody listening is not an error.
    fn notify(&self, event: SyncEvent);

    /// Register a handler. It stays active until the returned [`Subscription`] drops.
    fn on_notify(&self, handler: SyncHandler) -> Subscription;
}

/// Keeps a handler registered. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    #[must_use]
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    /// A subscription that was never attached to anything.
    #[must_use]
    pub fn detached() -> Self {
        Self { task: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// In-process channel backed by [`tokio::sync::broadcast`]. Clones share the
/// same bus, so hand one clone to each tab.
#[derive(Clone, Debug)]
pub struct BroadcastChannel {
    sender: broadcast::Sender<SyncEvent>,
}

impl Default for BroadcastChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl BroadcastChannel {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }
}

impl SyncChannel for BroadcastChannel {
    fn notify(&self, event: SyncEvent) {
        match self.sender.send(event) {
            Ok(receivers) => trace!(?event, receivers, "sync event sent"),
            Err(_) => trace!(?event, "sync event dropped, no subscribers"),
        }
    }

    /// Must be called from within a tokio runtime.
    fn on_notify(&self, handler: SyncHandler) -> Subscription {
        let mut receiver = self.sender.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => handler(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "sync subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Subscription::new(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn subscribers_receive_events() -> Result<()> {
        let channel = BroadcastChannel::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = channel.on_notify(Box::new(move |event| {
            let _ = tx.send(event);
        }));

        let event = SyncEvent {
            origin: Uuid::new_v4(),
            kind: SyncKind::SignedIn,
        };
        channel.notify(event);

        let received = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await?;
        assert_eq!(received, Some(event));
        Ok(())
    }

    #[tokio::test]
    async fn dropping_subscription_stops_delivery() -> Result<()> {
        let channel = BroadcastChannel::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = channel.on_notify(Box::new(move |event| {
            let _ = tx.send(event);
        }));
        drop(subscription);
        tokio::task::yield_now().await;

        channel.notify(SyncEvent {
            origin: Uuid::new_v4(),
            kind: SyncKind::SignedOut,
        });

        // The handler (and its sender) went away with the aborted task.
        let received = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await?;
        assert_eq!(received, None);
        Ok(())
    }

    #[test]
    fn notify_without_subscribers_is_fine() {
        let channel = BroadcastChannel::new(0);
        channel.notify(SyncEvent {
            origin: Uuid::new_v4(),
            kind: SyncKind::SignedOut,
        });
    }
}
