//! Cancellation safety under load.
//!
//! Callers are cancelled at random points (while waiting, constructing,
//! holding or releasing a resource). Afterwards nothing may be left checked
//! out and the limit must never have been exceeded.

use std::sync::Arc;
use std::time::Duration;

use nebula_pool::Pool;
use nebula_pool::testing::{MockConstructor, MockResource, Outcome};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

async fn settle(pool: &Pool<MockResource>) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while pool.is_busy() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("every share should be released or retired");
}

fn random_delay(max_micros: u64) -> Duration {
    Duration::from_micros(fastrand::u64(0..max_micros))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancelled_callers_leave_no_resource_checked_out() {
    let limit = 4;
    let constructor = MockConstructor::new().with_delay(Duration::from_micros(200));
    let pool = Pool::builder(constructor.clone())
        .limit(limit)
        .build()
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..32 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..20 {
                let _ = tokio::time::timeout(
                    random_delay(800),
                    pool.acquire_with(|_resource| tokio::time::sleep(random_delay(400))),
                )
                .await;
                assert!(pool.size() <= limit);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    settle(&pool).await;
    assert!(pool.size() <= limit);

    // The pool still works after the storm.
    let resource = tokio::time::timeout(Duration::from_secs(5), pool.acquire())
        .await
        .expect("pool must not be wedged")
        .unwrap();
    pool.release(&resource).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancelled_releases_retire_instead_of_leaking() {
    let pool = Pool::builder(MockConstructor::new())
        .limit(2)
        .build()
        .unwrap();

    for _ in 0..200 {
        let resource = pool.acquire().await.unwrap();
        // `reusable()` yields once, so a zero timeout can land inside it.
        let _ = tokio::time::timeout(Duration::ZERO, pool.release(&resource)).await;
        if pool.contains(&resource) && pool.usage(&resource) == Some(1) {
            pool.release(&resource).await.unwrap();
        }
    }

    settle(&pool).await;
    assert!(pool.size() <= 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn multiplexed_resources_survive_cancellation() {
    let limit = 2;
    let constructor = MockConstructor::multiplexed(3)
        .with_delay(Duration::from_micros(100))
        .then(Outcome::Fail)
        .then(Outcome::Nothing);
    let pool = Pool::builder(constructor)
        .limit(limit)
        .concurrency(2)
        .build()
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..25 {
                let outcome = tokio::time::timeout(random_delay(600), pool.lease()).await;
                if let Ok(Ok(lease)) = outcome {
                    let holders = pool.usage(lease.resource()).unwrap_or(0);
                    assert!(holders <= 3);
                    tokio::time::sleep(random_delay(200)).await;
                    if fastrand::bool() {
                        drop(lease);
                    } else {
                        let _ = tokio::time::timeout(random_delay(50), lease.release()).await;
                    }
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    settle(&pool).await;
    assert!(pool.size() <= limit);
    let resources: Vec<Arc<MockResource>> = pool.resources().into_iter().map(|(r, _)| r).collect();
    assert!(resources.iter().all(|resource| !resource.is_closed()));
}
