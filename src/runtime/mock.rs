//! Spawner for tests and demos
//!
//! `blocking()` drives each load to completion on the calling thread before
//! `spawn` returns, so tests can assert on the outcome straight away. `new()`
//! discards loads unpolled, which is how the "task vanished" path of
//! [`TiledCubemap`](crate::TiledCubemap) gets exercised.

use std::future::Future;

use super::{AsyncSpawner, JoinHandle};

/// Executor-free spawner
#[derive(Clone, Copy, Debug, Default)]
pub struct MockSpawner {
    run_inline: bool,
}

impl MockSpawner {
    /// Spawner that drops every load without running it
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawner that runs every load inline with `futures::executor::block_on`
    pub fn blocking() -> Self {
        Self { run_inline: true }
    }

    pub fn runs_inline(&self) -> bool {
        self.run_inline
    }
}

impl AsyncSpawner for MockSpawner {
    fn spawn<F>(&self, task: F) -> JoinHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.run_inline {
            futures::executor::block_on(task);
        } else {
            log::trace!("MockSpawner discarding load task");
        }
        JoinHandle::new(())
    }

    fn runtime_name(&self) -> &'static str {
        if self.run_inline {
            "mock-inline"
        } else {
            "mock-discard"
        }
    }
}
