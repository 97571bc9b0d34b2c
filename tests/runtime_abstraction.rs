//! Integration tests for async runtime abstraction

use cubemap_stream::{yield_now, AsyncSpawner, MockSpawner};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_mock_spawner_integration() {
    let spawner = MockSpawner::blocking();

    let executed = Arc::new(AtomicBool::new(false));
    let executed_clone = Arc::clone(&executed);

    spawner.spawn(async move {
        yield_now().await;
        executed_clone.store(true, Ordering::SeqCst);
    });

    // In blocking mode, should execute immediately
    assert!(executed.load(Ordering::SeqCst));
}

#[test]
fn test_spawner_trait_bound() {
    fn spawn_task<S: AsyncSpawner>(spawner: &S) {
        spawner.spawn(async {});
    }

    let spawner = MockSpawner::new();
    spawn_task(&spawner);
}

#[test]
fn test_yield_lets_other_futures_progress() {
    let order = Arc::new(AtomicUsize::new(0));
    let first = Arc::clone(&order);
    let second = Arc::clone(&order);

    let (a, b) = futures::executor::block_on(futures::future::join(
        async move {
            yield_now().await;
            first.fetch_add(1, Ordering::SeqCst)
        },
        async move { second.fetch_add(1, Ordering::SeqCst) },
    ));

    // The yielding future finishes after the one that did not yield
    assert_eq!(b, 0);
    assert_eq!(a, 1);
}

#[cfg(feature = "runtime-tokio")]
#[tokio::test]
async fn test_tokio_spawner_runs_in_background() {
    use cubemap_stream::TokioSpawner;

    let spawner = TokioSpawner::new();
    let name = spawner.runtime_name();
    let (tx, rx) = futures::channel::oneshot::channel();

    let _handle = spawner.spawn(async move {
        yield_now().await;
        let _ = tx.send(name);
    });

    assert_eq!(rx.await.unwrap(), "Tokio");
}
