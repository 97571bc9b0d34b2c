//! Tokio spawner
//!
//! Loads go to the runtime the spawner was built for, or to the ambient runtime
//! of whichever thread calls [`AsyncSpawner::spawn`].

use std::future::Future;

use tokio::runtime::Handle;

use super::{AsyncSpawner, JoinHandle};

/// Spawns loads as Tokio tasks
#[derive(Clone, Debug, Default)]
pub struct TokioSpawner {
    runtime: Option<Handle>,
}

impl TokioSpawner {
    /// Spawner using the ambient runtime; `spawn` must be called from inside one
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawner bound to `runtime`, usable from threads outside it (e.g. a render loop)
    pub fn on(runtime: Handle) -> Self {
        Self {
            runtime: Some(runtime),
        }
    }
}

impl AsyncSpawner for TokioSpawner {
    fn spawn<F>(&self, task: F) -> JoinHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let task = match &self.runtime {
            Some(runtime) => runtime.spawn(task),
            None => tokio::spawn(task),
        };
        JoinHandle::new(task)
    }

    fn runtime_name(&self) -> &'static str {
        "Tokio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;

    #[tokio::test]
    async fn test_ambient_runtime_runs_task() {
        let (tx, rx) = oneshot::channel();
        let _task = TokioSpawner::new().spawn(async move {
            let _ = tx.send(3u8);
        });
        assert_eq!(rx.await.unwrap(), 3);
    }

    #[test]
    fn test_bound_spawner_works_off_runtime_threads() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let spawner = TokioSpawner::on(runtime.handle().clone());
        let (tx, rx) = oneshot::channel();

        // Called from a plain test thread, not a runtime worker
        let _task = spawner.spawn(async move {
            crate::runtime::yield_now().await;
            let _ = tx.send("done");
        });

        assert_eq!(runtime.block_on(rx).unwrap(), "done");
        assert_eq!(spawner.runtime_name(), "Tokio");
    }
}
