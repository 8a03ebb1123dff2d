//! Gardener — the pool's background lifecycle task.
//!
//! Started lazily with the first resource. While the owning scope is alive it
//! parks on the pool notification and runs the policy after every signal.
//! When the scope token is cancelled it closes the pool. The task holds only
//! a weak reference, so it never keeps a dropped pool alive.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::notify::Notification;
use crate::pool::{Pool, WeakPool};
use crate::resource::Resource;

/// Handle on a running gardener task.
#[derive(Debug)]
pub(crate) struct Gardener {
    stop: CancellationToken,
    task: JoinHandle<()>,
}

impl Gardener {
    /// Spawn a gardener for `pool` onto `runtime`.
    pub(crate) fn spawn<R: Resource>(runtime: &Handle, pool: &Pool<R>) -> Self {
        let stop = CancellationToken::new();
        let task = runtime.spawn(tend(
            pool.downgrade(),
            pool.scope(),
            stop.clone(),
            pool.notification(),
        ));
        Self { stop, task }
    }

    pub(crate) fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Ask the task to exit without closing the pool. Does not wait.
    pub(crate) fn stop(self) {
        self.stop.cancel();
    }

    /// Ask the task to exit and wait until it has.
    ///
    /// Returns at once when called from the gardener task itself, e.g. a
    /// policy closing the pool.
    pub(crate) async fn shutdown(self) {
        self.stop.cancel();
        if tokio::task::try_id() == Some(self.task.id()) {
            return;
        }
        if let Err(err) = self.task.await {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %err, "gardener task failed");
            #[cfg(not(feature = "tracing"))]
            let _ = err;
        }
    }

    #[cfg(test)]
    pub(crate) fn abort_handle(&self) -> tokio::task::AbortHandle {
        self.task.abort_handle()
    }
}

async fn tend<R: Resource>(
    pool: WeakPool<R>,
    scope: CancellationToken,
    stop: CancellationToken,
    notification: Arc<Notification>,
) {
    #[cfg(feature = "tracing")]
    tracing::debug!("gardener started");

    let mut signalled = notification.subscribe();
    loop {
        tokio::select! {
            biased;
            () = stop.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("gardener stopped");
                return;
            }
            () = scope.cancelled() => break,
            () = &mut signalled => {
                // Signals raised while the policy runs start another round.
                signalled = notification.subscribe();
                let Some(pool) = pool.upgrade() else {
                    return;
                };
                pool.apply_policy().await;
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("owning scope ended, closing pool");

    if let Some(pool) = pool.upgrade() {
        pool.detach_gardener();
        pool.close().await;
    }
}
