//! Availability ledger — the pool's bookkeeping.
//!
//! `resources` is the ground truth: a resource is live exactly while it has a
//! slot here. `available` is a stack of hints about resources that might have
//! spare capacity. Hints go stale (the resource was retired, or filled up
//! again) and are only validated when popped, most recent first.
//!
//! Nothing in this module suspends; the pool calls it under its mutex.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::resource::Resource;

/// Identity of a pooled resource: the address of its shared allocation.
///
/// Addresses cannot alias while a slot or an `available` hint holds the
/// `Arc`, which is the only time the ledger compares them.
pub(crate) fn identity<R>(resource: &Arc<R>) -> usize {
    Arc::as_ptr(resource).addr()
}

fn capacity<R: Resource>(resource: &R) -> usize {
    resource.concurrency().max(1)
}

pub(crate) struct Slot<R> {
    /// Sequence number, assigned at registration
    pub(crate) id: u64,
    pub(crate) resource: Arc<R>,
    pub(crate) usage: usize,
    /// Outcome of the last `viable()` probe
    pub(crate) viable: bool,
}

/// Per-resource line of a pool summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlotView {
    pub(crate) id: u64,
    pub(crate) usage: usize,
    pub(crate) concurrency: usize,
    pub(crate) viable: bool,
}

pub(crate) struct Ledger<R> {
    resources: IndexMap<usize, Slot<R>>,
    available: Vec<Arc<R>>,
    /// Constructions in flight; they count against the limit
    pending: usize,
    next_id: u64,
}

impl<R: Resource> Ledger<R> {
    pub(crate) fn new() -> Self {
        Self {
            resources: IndexMap::new(),
            available: Vec::new(),
            pending: 0,
            next_id: 1,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.resources.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.resources.values().any(|slot| slot.usage > 0)
    }

    pub(crate) fn contains(&self, resource: &Arc<R>) -> bool {
        self.resources.contains_key(&identity(resource))
    }

    pub(crate) fn usage(&self, resource: &Arc<R>) -> Option<usize> {
        self.resources.get(&identity(resource)).map(|slot| slot.usage)
    }

    /// Whether a live hint with spare capacity exists.
    pub(crate) fn has_available(&self) -> bool {
        self.available.iter().any(|resource| self.has_spare(resource))
    }

    /// Whether another resource may be constructed under `limit`.
    pub(crate) fn has_room(&self, limit: Option<usize>) -> bool {
        limit.is_none_or(|limit| self.resources.len() + self.pending < limit)
    }

    /// Reserve room for one construction; `false` when the pool is full.
    pub(crate) fn begin_construction(&mut self, limit: Option<usize>) -> bool {
        if !self.has_room(limit) {
            return false;
        }
        self.pending += 1;
        true
    }

    pub(crate) fn end_construction(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    pub(crate) fn idle_count(&self) -> usize {
        self.resources.values().filter(|slot| slot.usage == 0).count()
    }

    fn has_spare(&self, resource: &Arc<R>) -> bool {
        self.resources
            .get(&identity(resource))
            .is_some_and(|slot| slot.usage < capacity(resource.as_ref()))
    }

    /// Next reuse candidate, discarding stale and saturated hints on the way.
    ///
    /// The candidate stays on the stack: its viability still has to be
    /// probed (outside the lock) before [`Ledger::claim`] takes a share.
    pub(crate) fn candidate(&mut self) -> Option<Arc<R>> {
        while let Some(last) = self.available.last() {
            if self.has_spare(last) {
                return Some(Arc::clone(last));
            }
            self.available.pop();
        }
        None
    }

    /// Take one share of `resource` if it is still live with spare capacity.
    ///
    /// A resource that reaches its capacity leaves the stack.
    pub(crate) fn claim(&mut self, resource: &Arc<R>) -> bool {
        let capacity = capacity(resource.as_ref());
        let Some(slot) = self.resources.get_mut(&identity(resource)) else {
            return false;
        };
        if slot.usage >= capacity {
            return false;
        }
        slot.usage += 1;
        slot.viable = true;
        if slot.usage == capacity {
            self.forget_hint(resource);
        }
        true
    }

    fn forget_hint(&mut self, resource: &Arc<R>) {
        if let Some(position) = self
            .available
            .iter()
            .rposition(|hint| Arc::ptr_eq(hint, resource))
        {
            self.available.remove(position);
        }
    }

    /// Record the probe outcome used by the textual summary.
    pub(crate) fn note_viability(&mut self, resource: &Arc<R>, viable: bool) {
        if let Some(slot) = self.resources.get_mut(&identity(resource)) {
            slot.viable = viable;
        }
    }

    /// Add a freshly constructed resource, already acquired once.
    pub(crate) fn register(&mut self, resource: Arc<R>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        if capacity(resource.as_ref()) > 1 {
            self.available.push(Arc::clone(&resource));
        }
        self.resources.insert(
            identity(&resource),
            Slot {
                id,
                resource,
                usage: 1,
                viable: true,
            },
        );
        id
    }

    /// Give back one share of `resource`.
    ///
    /// Fails when the resource is unknown or not currently acquired.
    pub(crate) fn reuse(&mut self, resource: &Arc<R>) -> Result<()> {
        let previous = match self.resources.get_mut(&identity(resource)) {
            Some(slot) if slot.usage > 0 => {
                let previous = slot.usage;
                slot.usage -= 1;
                previous
            }
            Some(slot) => return Err(Error::unacquired(format!("#{}", slot.id))),
            None => return Err(Error::unacquired("(not in pool)")),
        };
        self.mark_available_if_freed(resource, previous);
        Ok(())
    }

    /// A resource that was saturated before this release has a free share now.
    pub(crate) fn mark_available_if_freed(&mut self, resource: &Arc<R>, previous_usage: usize) {
        if previous_usage == capacity(resource.as_ref()) {
            self.available.push(Arc::clone(resource));
        }
    }

    /// Forget `resource`; its hints go stale and are dropped lazily.
    pub(crate) fn remove(&mut self, resource: &Arc<R>) -> Option<Slot<R>> {
        self.resources.shift_remove(&identity(resource))
    }

    /// Forget `resource` only if nobody holds it.
    pub(crate) fn remove_if_idle(&mut self, resource: &Arc<R>) -> Option<Slot<R>> {
        match self.resources.get(&identity(resource)) {
            Some(slot) if slot.usage == 0 => self.remove(resource),
            _ => None,
        }
    }

    /// Resources nobody holds, in registration order.
    pub(crate) fn idle(&self) -> Vec<Arc<R>> {
        self.resources
            .values()
            .filter(|slot| slot.usage == 0)
            .map(|slot| Arc::clone(&slot.resource))
            .collect()
    }

    /// Resources with a free share, in registration order.
    pub(crate) fn spare(&self) -> Vec<Arc<R>> {
        self.resources
            .values()
            .filter(|slot| slot.usage < capacity(slot.resource.as_ref()))
            .map(|slot| Arc::clone(&slot.resource))
            .collect()
    }

    /// Replace the hint stack with the `reusable` subset of a `probed`
    /// snapshot of [`Ledger::spare`].
    ///
    /// Hints pushed for resources outside the snapshot (released while the
    /// probes ran) survive; everything kept must still have room.
    pub(crate) fn rebuild_available(&mut self, probed: &[Arc<R>], reusable: Vec<Arc<R>>) {
        let mut rebuilt: Vec<Arc<R>> = self
            .available
            .drain(..)
            .filter(|hint| !probed.iter().any(|seen| Arc::ptr_eq(seen, hint)))
            .collect();
        rebuilt.extend(reusable);
        rebuilt.retain(|resource| self.has_spare(resource));
        self.available = rebuilt;
    }

    /// Remove every resource and hint, handing the resources back with
    /// their usage.
    pub(crate) fn drain(&mut self) -> Vec<(Arc<R>, u64, usize)> {
        self.available.clear();
        self.resources
            .drain(..)
            .map(|(_, slot)| (slot.resource, slot.id, slot.usage))
            .collect()
    }

    pub(crate) fn resources(&self) -> Vec<(Arc<R>, usize)> {
        self.resources
            .values()
            .map(|slot| (Arc::clone(&slot.resource), slot.usage))
            .collect()
    }

    pub(crate) fn available(&self) -> Vec<Arc<R>> {
        self.available.clone()
    }

    pub(crate) fn entries(&self) -> Vec<(Arc<R>, SlotView)> {
        self.resources
            .values()
            .map(|slot| {
                let view = SlotView {
                    id: slot.id,
                    usage: slot.usage,
                    concurrency: capacity(slot.resource.as_ref()),
                    viable: slot.viable,
                };
                (Arc::clone(&slot.resource), view)
            })
            .collect()
    }
}
