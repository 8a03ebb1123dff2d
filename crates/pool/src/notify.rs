//! Waiter notification — broadcast wake-up for callers parked on the pool.
//!
//! Every signal wakes every waiter. Woken waiters re-check the ledger on
//! their own; several may find nothing and park again.

use std::pin::Pin;

use tokio::sync::Notify;
use tokio::sync::futures::Notified;

#[derive(Debug, Default)]
pub(crate) struct Notification {
    notify: Notify,
}

impl Notification {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait for the next signal.
    pub(crate) async fn wait(&self) {
        self.notify.notified().await;
    }

    /// Register interest before checking pool state.
    ///
    /// A signal sent after this call and before the returned future is
    /// awaited is not lost.
    pub(crate) fn subscribe(&self) -> Pin<Box<Notified<'_>>> {
        let mut notified = Box::pin(self.notify.notified());
        notified.as_mut().enable();
        notified
    }

    /// Wake all current waiters.
    pub(crate) fn signal(&self) {
        self.notify.notify_waiters();
    }
}
