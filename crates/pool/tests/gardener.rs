//! Gardener lifecycle: owning scope, pool drop.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use nebula_pool::testing::{MockConstructor, MockResource, Outcome};
use nebula_pool::{Error, Policy, Pool, PoolConfig, Result};
use tokio_util::sync::CancellationToken;

async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Counts how often the gardener runs it; one run per signal per gardener.
#[derive(Default, Clone)]
struct Counting {
    runs: Arc<AtomicUsize>,
}

impl Counting {
    fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl Policy<MockResource> for Counting {
    fn apply<'a>(&'a self, _pool: &'a Pool<MockResource>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

/// Release `resource` and check the policy ran exactly once for it.
async fn release_runs_policy_once(pool: &Pool<MockResource>, policy: &Counting, resource: &Arc<MockResource>) {
    let before = policy.runs();
    pool.release(resource).await.unwrap();
    eventually(|| policy.runs() > before).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(policy.runs(), before + 1, "more than one gardener is running");
}

#[tokio::test]
async fn gardener_starts_with_the_first_resource() {
    let pool = Pool::new(MockConstructor::new(), PoolConfig::default()).unwrap();
    assert!(!pool.has_gardener());

    let resource = pool.acquire().await.unwrap();

    assert!(pool.has_gardener());
    pool.release(&resource).await.unwrap();
}

#[tokio::test]
async fn failed_construction_starts_no_gardener() {
    let constructor = MockConstructor::new().then(Outcome::Fail);
    let pool = Pool::new(constructor, PoolConfig::default()).unwrap();

    assert!(pool.acquire().await.is_err());
    assert!(!pool.has_gardener());
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelling_the_scope_closes_the_pool() {
    let scope = CancellationToken::new();
    let pool = Pool::builder(MockConstructor::new())
        .scope(&scope)
        .build()
        .unwrap();

    let idle = pool.acquire().await.unwrap();
    let busy = pool.acquire().await.unwrap();
    pool.release(&idle).await.unwrap();
    assert_eq!(pool.size(), 2);

    scope.cancel();

    eventually(|| pool.is_empty()).await;
    eventually(|| idle.is_closed() && busy.is_closed()).await;
    eventually(|| !pool.has_gardener()).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn pool_scope_is_a_child_of_the_given_token() {
    let parent = CancellationToken::new();
    let pool = Pool::builder(MockConstructor::new())
        .scope(&parent)
        .build()
        .unwrap();

    pool.scope().cancel();
    assert!(!parent.is_cancelled());

    parent.cancel();
    assert!(pool.scope().is_cancelled());
}

#[tokio::test(flavor = "multi_thread")]
async fn dropping_the_pool_closes_its_resources() {
    let pool = Pool::new(MockConstructor::new(), PoolConfig::default()).unwrap();
    let resource = pool.acquire().await.unwrap();
    pool.release(&resource).await.unwrap();

    drop(pool);

    eventually(|| resource.is_closed()).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn gardener_does_not_keep_the_pool_alive() {
    let pool = Pool::new(MockConstructor::new(), PoolConfig::default()).unwrap();
    let resource = pool.acquire().await.unwrap();
    let scope = pool.scope();

    drop(pool);

    eventually(|| resource.is_closed()).await;
    assert!(!scope.is_cancelled());
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_first_constructions_start_one_gardener() {
    let policy = Counting::default();
    let pool = Pool::builder(MockConstructor::new().with_delay(Duration::from_millis(10)))
        .concurrency(8)
        .policy(policy.clone())
        .build()
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move { pool.acquire().await }));
    }
    let mut held = Vec::new();
    for handle in handles {
        held.push(handle.await.unwrap().unwrap());
    }
    assert_eq!(pool.size(), 8);
    assert!(pool.has_gardener());

    release_runs_policy_once(&pool, &policy, &held[0]).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn close_then_reacquire_keeps_one_gardener() {
    let policy = Counting::default();
    let pool = Pool::builder(MockConstructor::new())
        .policy(policy.clone())
        .build()
        .unwrap();

    let first = pool.acquire().await.unwrap();
    release_runs_policy_once(&pool, &policy, &first).await;
    pool.close().await;
    assert!(!pool.has_gardener());

    let second = pool.acquire().await.unwrap();
    assert!(pool.has_gardener());
    release_runs_policy_once(&pool, &policy, &second).await;
}

// ---------------------------------------------------------------------------
// After the owning scope ends
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn acquire_after_scope_end_is_refused() {
    let scope = CancellationToken::new();
    let constructor = MockConstructor::new();
    let pool = Pool::builder(constructor.clone())
        .scope(&scope)
        .build()
        .unwrap();
    let first = pool.acquire().await.unwrap();
    pool.release(&first).await.unwrap();

    scope.cancel();
    eventually(|| pool.is_empty() && !pool.has_gardener()).await;

    let err = pool.acquire().await.unwrap_err();

    assert!(matches!(err, Error::ScopeEnded));
    assert!(pool.is_empty());
    assert!(!pool.has_gardener());
    assert_eq!(constructor.produced(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn scope_end_during_construction_closes_the_new_resource() {
    let scope = CancellationToken::new();
    let constructor = MockConstructor::new().with_delay(Duration::from_millis(50));
    let pool = Pool::builder(constructor.clone())
        .scope(&scope)
        .build()
        .unwrap();

    let acquiring = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.acquire().await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    scope.cancel();

    let err = acquiring.await.unwrap().unwrap_err();

    assert!(matches!(err, Error::ScopeEnded));
    assert!(pool.is_empty());
    assert!(!pool.has_gardener());
    assert_eq!(constructor.produced(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn waiters_are_refused_when_the_scope_ends() {
    let scope = CancellationToken::new();
    let pool = Pool::builder(MockConstructor::new())
        .limit(1)
        .scope(&scope)
        .build()
        .unwrap();
    let held = pool.acquire().await.unwrap();

    let waiter = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.acquire().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    scope.cancel();

    let err = tokio::time::timeout(Duration::from_secs(5), waiter)
        .await
        .expect("scope end must wake waiters")
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, Error::ScopeEnded));
    eventually(|| held.is_closed()).await;
}
