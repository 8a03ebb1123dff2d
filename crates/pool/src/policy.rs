//! Pool policies — automatic maintenance run by the gardener.
//!
//! The gardener invokes the policy after every pool signal (release,
//! retirement, close). Policy errors are logged, never propagated.

use futures::future::BoxFuture;

use crate::error::Result;
use crate::pool::Pool;
use crate::resource::Resource;

/// Maintenance hook invoked with the pool after it signals.
pub trait Policy<R: Resource>: Send + Sync + 'static {
    /// Human-readable name, used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Inspect the pool and act on it, typically by pruning.
    fn apply<'a>(&'a self, pool: &'a Pool<R>) -> BoxFuture<'a, Result<()>>;
}

/// Keeps at most `max_idle` unused resources around.
///
/// Whenever more resources sit idle, the surplus is retired oldest first.
#[derive(Debug, Clone, Copy)]
pub struct IdlePolicy {
    max_idle: usize,
}

impl IdlePolicy {
    /// Create a policy retaining up to `max_idle` idle resources.
    #[must_use]
    pub fn new(max_idle: usize) -> Self {
        Self { max_idle }
    }

    /// The number of idle resources this policy tolerates.
    pub fn max_idle(&self) -> usize {
        self.max_idle
    }
}

impl<R: Resource> Policy<R> for IdlePolicy {
    fn name(&self) -> &str {
        "idle"
    }

    fn apply<'a>(&'a self, pool: &'a Pool<R>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let idle = pool.idle_count();
            if idle > self.max_idle {
                let retain = pool.size().saturating_sub(idle - self.max_idle);
                pool.prune(retain).await;
            }
            Ok(())
        })
    }
}
