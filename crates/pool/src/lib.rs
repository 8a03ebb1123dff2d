//! # Nebula Pool
//!
//! Generic, concurrency-aware resource pool for the Nebula workflow engine.
//!
//! A [`Pool`] hands out resources (connections, sessions, channels) produced
//! by a [`Constructor`], reuses them after release, retires the ones that are
//! no longer viable, and closes everything when its owning scope ends.
//! Resources may be multiplexed: a resource whose
//! [`concurrency`](Resource::concurrency) is greater than one is shared by
//! that many holders at once.
//!
//! ```no_run
//! use nebula_pool::{Pool, PoolConfig, Resource, Result};
//!
//! struct Connection;
//!
//! impl Resource for Connection {}
//!
//! # async fn run() -> Result<()> {
//! let pool = Pool::wrap(|| async { Ok(Connection) }, PoolConfig::with_limit(4))?;
//! let answer = pool.acquire_with(|_connection| async { 42 }).await?;
//! assert_eq!(answer, 42);
//! pool.close().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod construction;
pub mod error;
pub mod lease;
pub mod policy;
pub mod pool;
pub mod resource;
pub mod summary;

mod gardener;
mod ledger;
mod notify;

#[cfg(feature = "testing")]
pub mod testing;

pub use config::PoolConfig;
pub use construction::{ConstructionGuard, ConstructionPermit};
pub use error::{Error, Result};
pub use lease::Lease;
pub use policy::{IdlePolicy, Policy};
pub use pool::{Pool, PoolBuilder};
pub use resource::{Constructor, Resource, wrap};
pub use summary::{CloseReport, PoolStats, PoolSummary};
