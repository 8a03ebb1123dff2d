//! Pruning of idle resources.

use std::sync::Arc;

use nebula_pool::testing::{MockConstructor, MockResource};
use nebula_pool::{Pool, PoolConfig};
use parking_lot::Mutex;

fn pool() -> Pool<MockResource> {
    Pool::new(MockConstructor::new(), PoolConfig::default()).unwrap()
}

async fn idle_resources(pool: &Pool<MockResource>, count: usize) -> Vec<Arc<MockResource>> {
    let mut resources = Vec::new();
    for _ in 0..count {
        resources.push(pool.acquire().await.unwrap());
    }
    for resource in &resources {
        pool.release(resource).await.unwrap();
    }
    resources
}

#[tokio::test]
async fn prune_retires_single_idle_resource() {
    let pool = pool();
    let resources = idle_resources(&pool, 1).await;

    let idle = pool.prune(0).await;

    assert_eq!(idle, 1);
    assert!(!pool.is_active());
    assert!(pool.available().is_empty());
    assert!(resources[0].is_closed());
}

#[tokio::test]
async fn prune_keeps_checked_out_resources() {
    let pool = pool();
    let resource = pool.acquire().await.unwrap();

    assert_eq!(pool.prune(0).await, 0);
    assert!(pool.contains(&resource));
    assert!(!resource.is_closed());

    pool.release(&resource).await.unwrap();
    assert!(pool.is_available());
}

#[tokio::test]
async fn prune_stops_at_retain() {
    let pool = pool();
    let resources = idle_resources(&pool, 3).await;

    let idle = pool.prune(1).await;

    assert_eq!(idle, 3);
    assert_eq!(pool.size(), 1);
    // Oldest first.
    assert!(resources[0].is_closed());
    assert!(resources[1].is_closed());
    assert!(!resources[2].is_closed());
    assert_eq!(pool.available().len(), 1);
    assert!(Arc::ptr_eq(&pool.available()[0], &resources[2]));
}

#[tokio::test]
async fn prune_counts_busy_resources_towards_retain() {
    let pool = pool();
    let busy = pool.acquire().await.unwrap();
    let idle = idle_resources(&pool, 2).await;

    pool.prune(2).await;

    assert_eq!(pool.size(), 2);
    assert!(pool.contains(&busy));
    assert!(idle[0].is_closed());
    assert!(!idle[1].is_closed());
}

#[tokio::test]
async fn prune_with_custom_eviction() {
    let pool = pool();
    let resources = idle_resources(&pool, 2).await;
    let evicted = Mutex::new(Vec::new());

    let idle = pool
        .prune_with(0, |resource| {
            let evicted = &evicted;
            let pool = &pool;
            async move {
                evicted.lock().push(resource.id());
                pool.retire(&resource).await;
            }
        })
        .await;

    assert_eq!(idle, 2);
    assert_eq!(*evicted.lock(), vec![1, 2]);
    assert!(pool.is_empty());
    assert!(resources.iter().all(|resource| resource.is_closed()));
}

#[tokio::test]
async fn prune_rebuilds_availability() {
    let pool = pool();
    let resources = idle_resources(&pool, 2).await;
    resources[1].set_reusable(false);

    pool.prune(2).await;

    assert_eq!(pool.size(), 2);
    let available = pool.available();
    assert_eq!(available.len(), 1);
    assert!(Arc::ptr_eq(&available[0], &resources[0]));
}
