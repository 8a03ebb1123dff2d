//! Pool controller — acquisition, release, retirement, pruning and close.
//!
//! `Pool<R>` shares a bounded set of resources between many concurrent
//! callers. A caller first tries to reuse a resource with a free share
//! (most recently freed first); failing that it constructs a new one, as
//! long as the resource limit allows. Both steps run under the
//! [`ConstructionGuard`], which bounds how many callers scan or construct at
//! once. When nothing can be had, the caller parks until the pool signals a
//! release, retirement or close.
//!
//! Bookkeeping sits behind one mutex that is never held across an `.await`.
//! Capability calls (`viable`, `reusable`, `close`) and the constructor run
//! outside it, and whatever they observed is re-validated afterwards.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::config::PoolConfig;
use crate::construction::ConstructionGuard;
use crate::error::{Error, Result};
use crate::gardener::Gardener;
use crate::lease::Lease;
use crate::ledger::Ledger;
use crate::notify::Notification;
use crate::policy::Policy;
use crate::resource::{self, Constructor, Resource};
use crate::summary::{CloseReport, Counters, PoolStats, PoolSummary, UsageString, slot_entry};

/// Inner shared state for the pool.
struct Inner<R: Resource> {
    constructor: Box<dyn Constructor<R>>,
    ledger: Mutex<Ledger<R>>,
    guard: ConstructionGuard,
    notification: Arc<Notification>,
    limit: Option<usize>,
    acquire_timeout: Option<Duration>,
    policy: Option<Box<dyn Policy<R>>>,
    /// Owning scope; cancelling it makes the gardener close the pool
    scope: CancellationToken,
    gardener: Mutex<Option<Gardener>>,
    counters: Counters,
}

/// Generic resource pool.
///
/// Cheap to clone; all clones share the same resources. Dropping the last
/// clone stops the gardener and closes whatever is still pooled.
pub struct Pool<R: Resource> {
    inner: Arc<Inner<R>>,
}

/// Non-owning pool reference held by the gardener.
pub(crate) struct WeakPool<R: Resource> {
    inner: Weak<Inner<R>>,
}

impl<R: Resource> WeakPool<R> {
    pub(crate) fn upgrade(&self) -> Option<Pool<R>> {
        self.inner.upgrade().map(|inner| Pool { inner })
    }
}

impl<R: Resource> Clone for Pool<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resource> fmt::Debug for Pool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("limit", &self.inner.limit)
            .field("concurrency", &self.inner.guard.limit())
            .field("size", &self.size())
            .field("stats", &self.stats())
            .finish()
    }
}

impl<R: Resource> fmt::Display for Pool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (size, entries) = {
            let ledger = self.inner.ledger.lock();
            (ledger.len(), ledger.entries())
        };
        let usage = UsageString {
            size,
            limit: self.inner.limit,
        };
        if entries.is_empty() {
            return write!(f, "Pool({usage})");
        }
        let availability: Vec<String> = entries.iter().map(|(_, view)| slot_entry(view)).collect();
        write!(f, "Pool({usage}) {}", availability.join(";"))
    }
}

/// Builder for [`Pool`].
pub struct PoolBuilder<R: Resource> {
    constructor: Box<dyn Constructor<R>>,
    config: PoolConfig,
    policy: Option<Box<dyn Policy<R>>>,
    scope: Option<CancellationToken>,
}

impl<R: Resource> PoolBuilder<R> {
    /// Replace the whole configuration.
    pub fn config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    /// Maximum number of live resources.
    pub fn limit(mut self, limit: usize) -> Self {
        self.config.limit = Some(limit);
        self
    }

    /// Number of callers allowed to scan or construct at once.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = Some(concurrency);
        self
    }

    /// Give up on an acquisition after `timeout`.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.config.acquire_timeout = Some(timeout);
        self
    }

    /// Maintenance policy run by the gardener.
    pub fn policy(mut self, policy: impl Policy<R>) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    /// Tie the pool's lifetime to `parent`: cancelling it closes the pool.
    pub fn scope(mut self, parent: &CancellationToken) -> Self {
        self.scope = Some(parent.child_token());
        self
    }

    /// Validate the configuration and create the pool.
    pub fn build(self) -> Result<Pool<R>> {
        self.config.validate()?;
        Ok(Pool {
            inner: Arc::new(Inner {
                constructor: self.constructor,
                ledger: Mutex::new(Ledger::new()),
                guard: ConstructionGuard::new(self.config.effective_concurrency()),
                notification: Arc::new(Notification::new()),
                limit: self.config.limit,
                acquire_timeout: self.config.acquire_timeout,
                policy: self.policy,
                scope: self.scope.unwrap_or_default(),
                gardener: Mutex::new(None),
                counters: Counters::default(),
            }),
        })
    }
}

/// Room for one construction, counted against the limit until settled.
///
/// Dropped unsettled (construction failed or was cancelled), it wakes
/// waiters that saw the pool full because of it.
struct Reservation<'a, R: Resource> {
    inner: &'a Inner<R>,
    open: bool,
}

impl<R: Resource> Reservation<'_, R> {
    fn settle(&mut self, ledger: &mut Ledger<R>) {
        if self.open {
            ledger.end_construction();
            self.open = false;
        }
    }
}

impl<R: Resource> Drop for Reservation<'_, R> {
    fn drop(&mut self) {
        if self.open {
            self.inner.ledger.lock().end_construction();
            self.inner.notification.signal();
        }
    }
}

/// Retires the resource if a release is abandoned mid-way.
struct PendingRelease<'a, R: Resource> {
    pool: &'a Pool<R>,
    resource: Option<&'a Arc<R>>,
}

impl<R: Resource> Drop for PendingRelease<'_, R> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.retire_detached(resource);
        }
    }
}

impl<R: Resource> Pool<R> {
    /// Start building a pool around `constructor`.
    pub fn builder(constructor: impl Constructor<R>) -> PoolBuilder<R> {
        PoolBuilder {
            constructor: Box::new(constructor),
            config: PoolConfig::default(),
            policy: None,
            scope: None,
        }
    }

    /// Create a pool from a constructor and configuration.
    ///
    /// # Errors
    /// Returns error if `config` is invalid (e.g. `limit == Some(0)`).
    pub fn new(constructor: impl Constructor<R>, config: PoolConfig) -> Result<Self> {
        Self::builder(constructor).config(config).build()
    }

    /// Create a pool from a factory that always produces a resource.
    pub fn wrap<F, Fut>(factory: F, config: PoolConfig) -> Result<Self>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        Self::new(resource::wrap(factory), config)
    }

    // -- acquisition ---------------------------------------------------------

    /// Acquire a resource, waiting while the pool is saturated.
    ///
    /// The caller owns one share of the returned resource and must hand it
    /// back with [`Pool::release`]. Prefer [`Pool::lease`] or
    /// [`Pool::acquire_with`], which release on every exit path.
    ///
    /// # Errors
    /// Returns the constructor's error if a new resource could not be built,
    /// [`Error::Timeout`] when the configured acquire timeout elapses, or
    /// [`Error::ScopeEnded`] once the owning scope has been cancelled.
    pub async fn acquire(&self) -> Result<Arc<R>> {
        let resource = match self.inner.acquire_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.wait_for_resource())
                .await
                .map_err(|_| Error::Timeout {
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })??,
            None => self.wait_for_resource().await?,
        };
        Counters::bump(&self.inner.counters.acquisitions);
        Ok(resource)
    }

    /// Acquire a resource wrapped in a [`Lease`] that releases it on drop.
    pub async fn lease(&self) -> Result<Lease<R>> {
        let resource = self.acquire().await?;
        Ok(Lease::new(self.clone(), resource))
    }

    /// Acquire a resource, run `block` with it, and release it afterwards.
    ///
    /// The release happens whether `block` completes, panics, or the
    /// returned future is dropped.
    pub async fn acquire_with<F, Fut, T>(&self, block: F) -> Result<T>
    where
        F: FnOnce(Arc<R>) -> Fut,
        Fut: Future<Output = T>,
    {
        let lease = self.lease().await?;
        let output = block(Arc::clone(lease.resource())).await;
        lease.release().await?;
        Ok(output)
    }

    async fn wait_for_resource(&self) -> Result<Arc<R>> {
        loop {
            let signalled = self.inner.notification.subscribe();
            if let Some(resource) = self.available_resource().await? {
                return Ok(resource);
            }
            #[cfg(feature = "tracing")]
            tracing::trace!(pool = %self, "waiting for a resource");
            signalled.await;
        }
    }

    async fn available_resource(&self) -> Result<Option<Arc<R>>> {
        if self.inner.scope.is_cancelled() {
            return Err(Error::ScopeEnded);
        }
        self.inner.guard.with_permit(self.reuse_or_construct()).await
    }

    /// One pass under the construction guard: reuse, else construct.
    async fn reuse_or_construct(&self) -> Result<Option<Arc<R>>> {
        if let Some(resource) = self.take_available().await {
            return Ok(Some(resource));
        }

        let reserved = self.inner.ledger.lock().begin_construction(self.inner.limit);
        if !reserved {
            return Ok(None);
        }
        let reservation = Reservation {
            inner: &self.inner,
            open: true,
        };
        self.create_resource(reservation).await
    }

    async fn take_available(&self) -> Option<Arc<R>> {
        loop {
            let candidate = self.inner.ledger.lock().candidate()?;
            if !self.probe_viable(&candidate).await {
                self.inner.ledger.lock().note_viability(&candidate, false);
                self.retire(&candidate).await;
                continue;
            }
            // Someone may have filled it while we probed; then the next
            // `candidate()` drops the hint.
            if self.inner.ledger.lock().claim(&candidate) {
                #[cfg(feature = "tracing")]
                tracing::debug!(pool = %self, "reusing resource");
                return Some(candidate);
            }
        }
    }

    async fn create_resource(&self, mut reservation: Reservation<'_, R>) -> Result<Option<Arc<R>>> {
        #[cfg(feature = "tracing")]
        tracing::debug!(pool = %self, "no available resources, allocating new one");

        let resource = match self.inner.constructor.construct().await {
            Ok(Some(resource)) => Arc::new(resource),
            Ok(None) => {
                reservation.settle(&mut self.inner.ledger.lock());
                return Ok(None);
            }
            Err(err) => {
                Counters::bump(&self.inner.counters.construction_failures);
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %err, "resource construction failed");
                return Err(err);
            }
        };

        let multiplexed = resource.concurrency() > 1;
        let registered = {
            let mut ledger = self.inner.ledger.lock();
            reservation.settle(&mut ledger);
            // Checked under the lock: the scope-end drain cannot miss it.
            (!self.inner.scope.is_cancelled()).then(|| ledger.register(Arc::clone(&resource)))
        };
        let Some(id) = registered else {
            self.inner.notification.signal();
            if let Err(err) = resource.close().await {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %err, "failed to close resource built after scope end");
                #[cfg(not(feature = "tracing"))]
                let _ = err;
            }
            return Err(Error::ScopeEnded);
        };
        Counters::bump(&self.inner.counters.created);
        #[cfg(feature = "tracing")]
        tracing::debug!(resource = id, "allocated resource");
        #[cfg(not(feature = "tracing"))]
        let _ = id;

        if multiplexed {
            // Its spare shares are usable right away.
            self.inner.notification.signal();
        }
        self.start_gardener();
        Ok(Some(resource))
    }

    // -- release and retirement ----------------------------------------------

    /// Hand back one share of `resource`.
    ///
    /// A reusable resource returns to the pool; anything else is retired.
    /// If the release is abandoned half-way (its future dropped), the
    /// resource is retired rather than left checked out.
    ///
    /// # Errors
    /// [`Error::UnacquiredResource`] if the pool holds no acquisition for a
    /// reusable `resource`, e.g. on a double release. The resource is
    /// retired in that case as well. Double releases are only detected for
    /// reusable resources: a non-reusable one is retired and `Ok(())` is
    /// returned whether or not it was held.
    pub async fn release(&self, resource: &Arc<R>) -> Result<()> {
        let mut pending = PendingRelease {
            pool: self,
            resource: Some(resource),
        };
        let reusable = self.probe_reusable(resource).await;
        pending.resource = None;

        if reusable {
            match self.reuse(resource) {
                Ok(()) => {
                    Counters::bump(&self.inner.counters.releases);
                    Ok(())
                }
                Err(err) => {
                    self.retire(resource).await;
                    Err(err)
                }
            }
        } else {
            Counters::bump(&self.inner.counters.releases);
            self.retire(resource).await;
            Ok(())
        }
    }

    fn reuse(&self, resource: &Arc<R>) -> Result<()> {
        self.inner.ledger.lock().reuse(resource)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(pool = %self, "reuse resource");
        self.inner.notification.signal();
        Ok(())
    }

    /// Release `resource` from a synchronous context (e.g. `Drop`).
    pub(crate) fn release_detached(&self, resource: Arc<R>) {
        match Handle::try_current() {
            Ok(runtime) => {
                let pool = self.clone();
                drop(runtime.spawn(async move {
                    if let Err(err) = pool.release(&resource).await {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(error = %err, "release on drop failed");
                        #[cfg(not(feature = "tracing"))]
                        let _ = err;
                    }
                }));
            }
            Err(_) => self.retire_detached(&resource),
        }
    }

    /// Remove `resource` from the pool and close it.
    ///
    /// Returns `false` (and does nothing) if the pool no longer tracks it.
    pub async fn retire(&self, resource: &Arc<R>) -> bool {
        let removed = self.inner.ledger.lock().remove(resource);
        match removed {
            Some(slot) => {
                self.finish_retirement(resource, slot.id).await;
                true
            }
            None => false,
        }
    }

    async fn retire_idle(&self, resource: Arc<R>) {
        let removed = self.inner.ledger.lock().remove_if_idle(&resource);
        if let Some(slot) = removed {
            self.finish_retirement(&resource, slot.id).await;
        }
    }

    async fn finish_retirement(&self, resource: &Arc<R>, id: u64) {
        #[cfg(feature = "tracing")]
        tracing::debug!(resource = id, "retire resource");
        Counters::bump(&self.inner.counters.retired);
        self.inner.notification.signal();
        close_resource(resource.as_ref(), id).await;
    }

    /// Retire without awaiting: bookkeeping now, `close()` on the runtime.
    fn retire_detached(&self, resource: &Arc<R>) {
        let removed = self.inner.ledger.lock().remove(resource);
        let Some(slot) = removed else {
            return;
        };
        Counters::bump(&self.inner.counters.retired);
        self.inner.notification.signal();
        spawn_close(vec![(Arc::clone(resource), slot.id)]);
    }

    // -- maintenance ---------------------------------------------------------

    /// Retire idle resources until at most `retain` resources are live.
    ///
    /// Returns the number of idle resources found, which can exceed the
    /// number retired when `retain` stops the sweep early.
    pub async fn prune(&self, retain: usize) -> usize {
        self.prune_with(retain, move |resource| self.retire_idle(resource))
            .await
    }

    /// Like [`Pool::prune`], but hands each idle resource to `evict` instead
    /// of retiring it.
    pub async fn prune_with<F, Fut>(&self, retain: usize, mut evict: F) -> usize
    where
        F: FnMut(Arc<R>) -> Fut,
        Fut: Future<Output = ()>,
    {
        let idle = self.inner.ledger.lock().idle();

        for resource in &idle {
            if self.size() <= retain {
                break;
            }
            evict(Arc::clone(resource)).await;
        }

        self.refresh_available().await;
        #[cfg(feature = "tracing")]
        tracing::debug!(idle = idle.len(), retain, pool = %self, "pruned pool");
        idle.len()
    }

    /// Rebuild the availability stack from every resource that has a free
    /// share and is reusable.
    async fn refresh_available(&self) {
        let probed = self.inner.ledger.lock().spare();
        let mut reusable = Vec::with_capacity(probed.len());
        for resource in &probed {
            if self.probe_reusable(resource).await {
                reusable.push(Arc::clone(resource));
            }
        }
        self.inner.ledger.lock().rebuild_available(&probed, reusable);
    }

    /// Close every resource and stop the gardener, waiting for its task to
    /// exit.
    ///
    /// Resources still checked out are closed too; each one is logged as a
    /// warning and counted in the report. The pool stays usable afterwards.
    pub async fn close(&self) -> CloseReport {
        let mut report = CloseReport::default();
        loop {
            // `close()` may re-enter the pool, so drain until nothing is left.
            let drained = self.inner.ledger.lock().drain();
            if drained.is_empty() {
                break;
            }
            self.inner.notification.signal();
            for (resource, id, usage) in drained {
                if usage > 0 {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(resource = id, usage, "closing resource while still in use");
                    report.in_use += 1;
                }
                Counters::bump(&self.inner.counters.retired);
                close_resource(resource.as_ref(), id).await;
                report.closed += 1;
            }
        }

        let gardener = self.inner.gardener.lock().take();
        if let Some(gardener) = gardener {
            gardener.shutdown().await;
        }
        report
    }

    /// Wait until the pool next signals a release, retirement or close.
    pub async fn wait(&self) {
        self.inner.notification.wait().await;
    }

    // -- configuration -------------------------------------------------------

    /// Maximum number of live resources, if bounded.
    pub fn limit(&self) -> Option<usize> {
        self.inner.limit
    }

    /// Current construction concurrency.
    pub fn concurrency(&self) -> usize {
        self.inner.guard.limit()
    }

    /// Change the construction concurrency at runtime.
    pub fn set_concurrency(&self, concurrency: usize) -> Result<()> {
        self.inner.guard.set_limit(concurrency)
    }

    /// The token whose cancellation closes this pool.
    pub fn scope(&self) -> CancellationToken {
        self.inner.scope.clone()
    }

    // -- introspection -------------------------------------------------------

    /// Number of live resources.
    pub fn size(&self) -> usize {
        self.inner.ledger.lock().len()
    }

    /// Whether the pool has any live resources.
    pub fn is_active(&self) -> bool {
        !self.is_empty()
    }

    /// Whether the pool has no live resources.
    pub fn is_empty(&self) -> bool {
        self.inner.ledger.lock().is_empty()
    }

    /// Whether any resource is currently checked out.
    pub fn is_busy(&self) -> bool {
        self.inner.ledger.lock().is_busy()
    }

    /// Whether a resource with a free share is waiting for reuse.
    pub fn is_available(&self) -> bool {
        self.inner.ledger.lock().has_available()
    }

    /// Number of live resources nobody holds.
    pub fn idle_count(&self) -> usize {
        self.inner.ledger.lock().idle_count()
    }

    /// Current usage of `resource`, or `None` if the pool does not track it.
    pub fn usage(&self, resource: &Arc<R>) -> Option<usize> {
        self.inner.ledger.lock().usage(resource)
    }

    /// Whether the pool tracks `resource`.
    pub fn contains(&self, resource: &Arc<R>) -> bool {
        self.inner.ledger.lock().contains(resource)
    }

    /// Snapshot of every live resource with its usage.
    pub fn resources(&self) -> Vec<(Arc<R>, usize)> {
        self.inner.ledger.lock().resources()
    }

    /// Snapshot of the availability stack, bottom first.
    ///
    /// Entries may be stale; they are validated when consumed.
    pub fn available(&self) -> Vec<Arc<R>> {
        self.inner.ledger.lock().available()
    }

    /// Structured summary; probes the viability of every resource.
    pub async fn summary(&self) -> PoolSummary {
        let entries = self.inner.ledger.lock().entries();
        let usage = entries.len();
        let mut availability_summary = Vec::with_capacity(usage);
        for (resource, mut view) in entries {
            view.viable = self.probe_viable(&resource).await;
            self.inner.ledger.lock().note_viability(&resource, view.viable);
            availability_summary.push(slot_entry(&view));
        }
        PoolSummary {
            limit: self.inner.limit,
            concurrency: self.concurrency(),
            usage,
            availability_summary,
        }
    }

    /// Get current pool statistics.
    pub fn stats(&self) -> PoolStats {
        self.inner.counters.snapshot()
    }

    // -- gardener plumbing ---------------------------------------------------

    fn start_gardener(&self) {
        let mut gardener = self.inner.gardener.lock();
        if gardener.as_ref().is_some_and(Gardener::is_running) {
            return;
        }
        match Handle::try_current() {
            Ok(runtime) => *gardener = Some(Gardener::spawn(&runtime, self)),
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("no runtime available, gardener not started");
            }
        }
    }

    /// Forget the gardener without stopping it; used by the gardener itself.
    pub(crate) fn detach_gardener(&self) {
        drop(self.inner.gardener.lock().take());
    }

    /// Whether the background gardener task is running.
    pub fn has_gardener(&self) -> bool {
        self.inner
            .gardener
            .lock()
            .as_ref()
            .is_some_and(Gardener::is_running)
    }

    pub(crate) fn downgrade(&self) -> WeakPool<R> {
        WeakPool {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub(crate) fn notification(&self) -> Arc<Notification> {
        Arc::clone(&self.inner.notification)
    }

    pub(crate) async fn apply_policy(&self) {
        let Some(policy) = self.inner.policy.as_deref() else {
            return;
        };
        if let Err(err) = policy.apply(self).await {
            #[cfg(feature = "tracing")]
            tracing::warn!(policy = policy.name(), error = %err, "pool policy failed");
            #[cfg(not(feature = "tracing"))]
            let _ = err;
        }
    }

    // -- capability probes ---------------------------------------------------

    async fn probe_viable(&self, resource: &Arc<R>) -> bool {
        match resource.viable().await {
            Ok(viable) => viable,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %err, "viability check failed, treating resource as not viable");
                #[cfg(not(feature = "tracing"))]
                let _ = err;
                false
            }
        }
    }

    async fn probe_reusable(&self, resource: &Arc<R>) -> bool {
        match resource.reusable().await {
            Ok(reusable) => reusable,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %err, "reusability check failed, retiring resource");
                #[cfg(not(feature = "tracing"))]
                let _ = err;
                false
            }
        }
    }
}

impl<R: Resource> Drop for Inner<R> {
    fn drop(&mut self) {
        if let Some(gardener) = self.gardener.get_mut().take() {
            gardener.stop();
        }
        let remaining: Vec<_> = self
            .ledger
            .get_mut()
            .drain()
            .into_iter()
            .map(|(resource, id, _)| (resource, id))
            .collect();
        if !remaining.is_empty() {
            spawn_close(remaining);
        }
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
async fn close_resource<R: Resource>(resource: &R, id: u64) {
    if let Err(err) = resource.close().await {
        #[cfg(feature = "tracing")]
        tracing::warn!(resource = id, error = %err, "failed to close resource");
    }
}

/// Close resources on the current runtime, if there is one.
fn spawn_close<R: Resource>(resources: Vec<(Arc<R>, u64)>) {
    match Handle::try_current() {
        Ok(runtime) => {
            drop(runtime.spawn(async move {
                for (resource, id) in resources {
                    close_resource(resource.as_ref(), id).await;
                }
            }));
        }
        Err(_) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(count = resources.len(), "no runtime available, resources dropped without close");
        }
    }
}
