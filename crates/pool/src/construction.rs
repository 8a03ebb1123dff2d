//! Construction guard — bounds how many acquisitions scan or construct at once.
//!
//! Independent of the pool's resource limit: a burst of callers on an empty
//! pool would otherwise all dial out at the same time.

use parking_lot::Mutex;
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::error::{Error, Result};

#[derive(Debug)]
struct Capacity {
    limit: usize,
    /// Permits still to be retired after a shrink, taken as they come back.
    debt: usize,
}

/// Counting gate with a permit count that can change at runtime.
#[derive(Debug)]
pub struct ConstructionGuard {
    semaphore: Semaphore,
    capacity: Mutex<Capacity>,
}

/// Permit held while one acquisition scans the ledger or constructs.
///
/// Returned to the gate on drop, on every exit path.
#[derive(Debug)]
pub struct ConstructionPermit<'a> {
    permit: Option<SemaphorePermit<'a>>,
    guard: &'a ConstructionGuard,
}

impl ConstructionGuard {
    /// Create a gate with `limit` permits.
    pub fn new(limit: usize) -> Self {
        Self {
            semaphore: Semaphore::new(limit),
            capacity: Mutex::new(Capacity { limit, debt: 0 }),
        }
    }

    /// The configured number of permits.
    pub fn limit(&self) -> usize {
        self.capacity.lock().limit
    }

    /// Wait for a permit.
    pub async fn acquire(&self) -> ConstructionPermit<'_> {
        // The semaphore is never closed.
        let permit = self.semaphore.acquire().await.ok();
        ConstructionPermit {
            permit,
            guard: self,
        }
    }

    /// Run `operation` while holding a permit.
    pub async fn with_permit<F, T>(&self, operation: F) -> T
    where
        F: Future<Output = T>,
    {
        let _permit = self.acquire().await;
        operation.await
    }

    /// Change the number of permits.
    ///
    /// Growing wakes blocked callers immediately. Shrinking retires idle
    /// permits now and the rest as holders return them, so it only affects
    /// future acquisitions.
    pub fn set_limit(&self, limit: usize) -> Result<()> {
        if limit == 0 {
            return Err(Error::configuration("concurrency must be greater than 0"));
        }
        let mut capacity = self.capacity.lock();
        if limit > capacity.limit {
            let mut grow = limit - capacity.limit;
            let settled = grow.min(capacity.debt);
            capacity.debt -= settled;
            grow -= settled;
            if grow > 0 {
                self.semaphore.add_permits(grow);
            }
        } else {
            let shrink = capacity.limit - limit;
            let forgotten = self.semaphore.forget_permits(shrink);
            capacity.debt += shrink - forgotten;
        }
        capacity.limit = limit;
        Ok(())
    }

    fn settle(&self, permit: SemaphorePermit<'_>) {
        let mut capacity = self.capacity.lock();
        if capacity.debt > 0 {
            capacity.debt -= 1;
            permit.forget();
        }
    }
}

impl Drop for ConstructionPermit<'_> {
    fn drop(&mut self) {
        if let Some(permit) = self.permit.take() {
            self.guard.settle(permit);
        }
    }
}
