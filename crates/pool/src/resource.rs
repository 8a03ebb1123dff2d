//! Resource capability contract and constructors
//!
//! The pool never looks inside a resource. It only asks the four questions
//! of [`Resource`]: can it be used right now, may it go back to the pool,
//! how many holders can share it, and how is it closed.

use std::future::Future;

use futures::future::BoxFuture;

use crate::error::Result;

/// Capability set every pooled resource provides.
///
/// All async methods may suspend (for instance to probe a socket). An `Err`
/// from `viable` or `reusable` is treated as `false`; an `Err` from `close`
/// is logged and otherwise ignored.
pub trait Resource: Send + Sync + 'static {
    /// Whether the resource can be handed out right now.
    fn viable(&self) -> impl Future<Output = Result<bool>> + Send {
        async { Ok(true) }
    }

    /// Whether the resource may return to the pool after a release.
    ///
    /// A resource can be viable but not reusable, e.g. while it is shutting
    /// down.
    fn reusable(&self) -> impl Future<Output = Result<bool>> + Send {
        async { Ok(true) }
    }

    /// Release the underlying OS or network resources.
    fn close(&self) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }

    /// Maximum number of simultaneous holders; `1` means exclusive use.
    fn concurrency(&self) -> usize {
        1
    }
}

/// Produces new resources for a pool.
///
/// `Ok(None)` means "nothing produced this time": the acquiring caller waits
/// for the next pool signal and tries again. `Err` is handed to the caller.
///
/// Any `Fn() -> impl Future<Output = Result<Option<R>>>` closure is a
/// constructor; use [`wrap`] for factories that always yield a resource.
pub trait Constructor<R>: Send + Sync + 'static {
    /// Build a new resource.
    fn construct(&self) -> BoxFuture<'_, Result<Option<R>>>;
}

impl<R, F, Fut> Constructor<R> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<R>>> + Send + 'static,
{
    fn construct(&self) -> BoxFuture<'_, Result<Option<R>>> {
        Box::pin(self())
    }
}

/// Adapt a factory that always produces a resource into a [`Constructor`].
pub fn wrap<R, F, Fut>(factory: F) -> impl Constructor<R>
where
    R: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    move || {
        let creating = factory();
        async move { creating.await.map(Some) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct Plain;

    impl Resource for Plain {}

    #[tokio::test]
    async fn default_capabilities() {
        let plain = Plain;
        assert!(plain.viable().await.unwrap());
        assert!(plain.reusable().await.unwrap());
        assert!(plain.close().await.is_ok());
        assert_eq!(plain.concurrency(), 1);
    }

    #[tokio::test]
    async fn wrapped_factory_always_produces() {
        let constructor = wrap(|| async { Ok::<_, Error>(7u32) });
        assert_eq!(constructor.construct().await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn closure_constructor_may_produce_nothing() {
        let constructor = || async { Ok::<Option<u32>, Error>(None) };
        assert!(constructor.construct().await.unwrap().is_none());
    }
}
