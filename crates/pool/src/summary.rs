//! Pool introspection: summaries and counters.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::ledger::SlotView;

/// Structured snapshot of a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PoolSummary {
    /// Maximum number of live resources (`None` = unbounded)
    pub limit: Option<usize>,
    /// Construction concurrency
    pub concurrency: usize,
    /// Number of live resources
    pub usage: usize,
    /// One `usage/concurrency[*]/#id` entry per live resource; `*` marks a
    /// resource that is not viable
    pub availability_summary: Vec<String>,
}

/// Pool statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PoolStats {
    /// Resources successfully constructed.
    pub created: u64,
    /// Resources retired and closed.
    pub retired: u64,
    /// Successful acquisitions.
    pub acquisitions: u64,
    /// Releases that returned a share to the pool or retired the resource.
    pub releases: u64,
    /// Constructor calls that failed.
    pub construction_failures: u64,
}

/// Outcome of [`Pool::close`](crate::Pool::close).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CloseReport {
    /// Resources closed.
    pub closed: usize,
    /// Of those, resources that were still checked out.
    pub in_use: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) created: AtomicU64,
    pub(crate) retired: AtomicU64,
    pub(crate) acquisitions: AtomicU64,
    pub(crate) releases: AtomicU64,
    pub(crate) construction_failures: AtomicU64,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> PoolStats {
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            retired: self.retired.load(Ordering::Relaxed),
            acquisitions: self.acquisitions.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            construction_failures: self.construction_failures.load(Ordering::Relaxed),
        }
    }
}

pub(crate) fn slot_entry(view: &SlotView) -> String {
    format!(
        "{}/{}{}/#{}",
        view.usage,
        view.concurrency,
        if view.viable { "" } else { "*" },
        view.id
    )
}

/// `size/limit` with `∞` for an unbounded pool.
pub(crate) struct UsageString {
    pub(crate) size: usize,
    pub(crate) limit: Option<usize>,
}

impl fmt::Display for UsageString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.limit {
            Some(limit) => write!(f, "{}/{}", self.size, limit),
            None => write!(f, "{}/∞", self.size),
        }
    }
}
