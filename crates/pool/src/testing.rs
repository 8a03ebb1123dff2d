//! Testing utilities: a controllable resource and a scripted constructor.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::resource::{Constructor, Resource};

/// Resource whose capabilities can be flipped from the test.
///
/// Every capability call yields to the scheduler once, so cancellation can
/// land inside it.
#[derive(Debug)]
pub struct MockResource {
    id: u64,
    concurrency: usize,
    viable: AtomicBool,
    reusable: AtomicBool,
    fail_close: AtomicBool,
    closed: AtomicBool,
    close_calls: AtomicUsize,
}

impl MockResource {
    /// An exclusive resource.
    pub fn new(id: u64) -> Self {
        Self::multiplexed(id, 1)
    }

    /// A resource shared by up to `concurrency` holders.
    pub fn multiplexed(id: u64, concurrency: usize) -> Self {
        Self {
            id,
            concurrency,
            viable: AtomicBool::new(true),
            reusable: AtomicBool::new(true),
            fail_close: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn set_viable(&self, viable: bool) {
        self.viable.store(viable, Ordering::SeqCst);
    }

    pub fn set_reusable(&self, reusable: bool) {
        self.reusable.store(reusable, Ordering::SeqCst);
    }

    /// Make `close()` return an error (it still counts as closed).
    pub fn fail_close(&self) {
        self.fail_close.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

impl Resource for MockResource {
    async fn viable(&self) -> Result<bool> {
        tokio::task::yield_now().await;
        Ok(self.viable.load(Ordering::SeqCst))
    }

    async fn reusable(&self) -> Result<bool> {
        tokio::task::yield_now().await;
        Ok(self.reusable.load(Ordering::SeqCst))
    }

    async fn close(&self) -> Result<()> {
        tokio::task::yield_now().await;
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(Error::resource("close", format!("mock #{} refused to close", self.id)));
        }
        Ok(())
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }
}

/// What the next constructor call does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Produce a fresh [`MockResource`].
    Produce,
    /// Produce nothing (`Ok(None)`).
    Nothing,
    /// Fail with [`Error::Construction`].
    Fail,
}

#[derive(Debug, Default)]
struct ConstructorState {
    concurrency: AtomicUsize,
    script: Mutex<VecDeque<Outcome>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
    next_id: AtomicU64,
}

/// Constructor that replays a script of outcomes, then produces forever.
///
/// Clones share state, so keep one to inspect the call counts.
#[derive(Debug, Clone)]
pub struct MockConstructor {
    state: Arc<ConstructorState>,
}

impl Default for MockConstructor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConstructor {
    /// Produces exclusive resources.
    pub fn new() -> Self {
        Self::multiplexed(1)
    }

    /// Produces resources shared by up to `concurrency` holders.
    pub fn multiplexed(concurrency: usize) -> Self {
        let state = ConstructorState {
            concurrency: AtomicUsize::new(concurrency),
            next_id: AtomicU64::new(1),
            ..ConstructorState::default()
        };
        Self {
            state: Arc::new(state),
        }
    }

    /// Append `outcome` to the script.
    #[must_use]
    pub fn then(self, outcome: Outcome) -> Self {
        self.push(outcome);
        self
    }

    /// Sleep for `delay` inside every call.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.state.delay.lock() = Some(delay);
        self
    }

    pub fn push(&self, outcome: Outcome) {
        self.state.script.lock().push_back(outcome);
    }

    /// Number of times the pool called the constructor.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Number of resources produced.
    pub fn produced(&self) -> u64 {
        self.state.next_id.load(Ordering::SeqCst) - 1
    }
}

impl Constructor<MockResource> for MockConstructor {
    fn construct(&self) -> BoxFuture<'_, Result<Option<MockResource>>> {
        Box::pin(async move {
            let state = &self.state;
            state.calls.fetch_add(1, Ordering::SeqCst);
            let delay = *state.delay.lock();
            match delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => tokio::task::yield_now().await,
            }
            let outcome = state.script.lock().pop_front().unwrap_or(Outcome::Produce);
            match outcome {
                Outcome::Produce => {
                    let id = state.next_id.fetch_add(1, Ordering::SeqCst);
                    let concurrency = state.concurrency.load(Ordering::SeqCst);
                    Ok(Some(MockResource::multiplexed(id, concurrency)))
                }
                Outcome::Nothing => Ok(None),
                Outcome::Fail => Err(Error::construction("scripted failure")),
            }
        })
    }
}
