//! Async runtime abstraction for background loads
//!
//! The strategies themselves are plain futures and run on any executor. Only
//! three things touch a runtime: launching a load in the background
//! ([`AsyncSpawner`]), handing control back between scheduling iterations
//! ([`yield_now`]), and pausing a pass that found nothing to do ([`idle`]).

pub mod mock;
#[cfg(feature = "runtime-tokio")]
pub mod tokio_impl;

use std::any::Any;
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

/// Owns whatever the runtime returned for a spawned load
///
/// Dropping it detaches the task; the outcome arrives through the
/// [`LoadHandle`](crate::LoadHandle) instead.
#[derive(Debug)]
pub struct JoinHandle {
    _task: Box<dyn Any + Send>,
}

impl JoinHandle {
    pub fn new<T: Send + 'static>(task: T) -> Self {
        Self {
            _task: Box::new(task),
        }
    }
}

/// Trait for launching background loads on an executor
///
/// # Example
/// ```ignore
/// let spawner = TokioSpawner::new();
/// let scope = cubemap.start_loading(strategy, "envs/lobby", scheduler, events, &spawner)?;
/// ```
pub trait AsyncSpawner: Send + Sync + Clone + Debug {
    /// Launch `task`; it must run to completion without being awaited
    fn spawn<F>(&self, task: F) -> JoinHandle
    where
        F: Future<Output = ()> + Send + 'static;

    /// Runtime name used in log lines
    fn runtime_name(&self) -> &'static str;
}

/// Cooperative scheduling point
#[cfg(feature = "runtime-tokio")]
pub use tokio::task::yield_now;

/// Cooperative scheduling point usable on any executor
#[cfg(not(feature = "runtime-tokio"))]
pub fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}

/// Future returned by [`yield_now`]: pending once, then ready
#[cfg(not(feature = "runtime-tokio"))]
#[derive(Debug)]
pub struct YieldNow {
    yielded: bool,
}

#[cfg(not(feature = "runtime-tokio"))]
impl Future for YieldNow {
    type Output = ();

    fn poll(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<()> {
        if self.yielded {
            return std::task::Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        std::task::Poll::Pending
    }
}

/// Pause a scheduling pass that dispatched nothing
///
/// Inside a Tokio runtime this sleeps for `interval`. On other executors it
/// falls back to a single yield.
pub async fn idle(interval: Duration) {
    if !sleep_on_runtime(interval).await {
        yield_now().await;
    }
}

#[cfg(feature = "runtime-tokio")]
async fn sleep_on_runtime(interval: Duration) -> bool {
    if tokio::runtime::Handle::try_current().is_err() {
        return false;
    }
    tokio::time::sleep(interval).await;
    true
}

#[cfg(not(feature = "runtime-tokio"))]
async fn sleep_on_runtime(_interval: Duration) -> bool {
    false
}

// Re-export implementations
pub use mock::MockSpawner;

#[cfg(feature = "runtime-tokio")]
pub use tokio_impl::TokioSpawner;
