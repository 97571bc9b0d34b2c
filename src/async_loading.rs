//! Background loading of a tiled cubemap
//!
//! [`TiledCubemap`] owns one [`TileSet`] and at most one running load. Starting
//! a load moves the tile set into a task on an [`AsyncSpawner`]; the caller
//! keeps the run's [`CancellationScope`] and gets the tile set back from
//! [`TiledCubemap::finish`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::channel::oneshot;
use parking_lot::RwLock;

use crate::cancel::CancellationScope;
use crate::error::{Result, StreamError};
use crate::events::StreamEvents;
use crate::loader::{FetchClient, FetchError};
use crate::runtime::{AsyncSpawner, JoinHandle};
use crate::scheduler::{LoadOutcome, StreamScheduler, Strategy};
use crate::spatial::PriorityMetric;
use crate::tile::{Division, TileId};
use crate::tile_set::TileSet;

/// Represents the current state of a background load
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadState {
    /// Spawned but not polled yet
    Pending,

    /// Fetching tiles; fraction of the set loaded (0.0 to 1.0)
    Streaming(f32),

    /// The run finished without being cancelled
    Completed,

    /// The run stopped because it was cancelled
    Cancelled,
}

impl LoadState {
    pub fn is_running(&self) -> bool {
        matches!(self, LoadState::Pending | LoadState::Streaming(_))
    }
}

/// State and loaded fraction shared between a handle and its task
#[derive(Debug)]
struct Progress {
    state: LoadState,
    fraction: f32,
}

/// Handle to a load running in the background
#[derive(Debug)]
pub struct LoadHandle {
    scope: CancellationScope,
    strategy: &'static str,
    progress: Arc<RwLock<Progress>>,
    result: oneshot::Receiver<(TileSet, LoadOutcome)>,
    _task: JoinHandle,
}

impl LoadHandle {
    /// Scope shared with the running strategy
    pub fn scope(&self) -> &CancellationScope {
        &self.scope
    }

    pub fn strategy(&self) -> &'static str {
        self.strategy
    }

    /// Ask the run to stop; no-op if it already has
    pub fn cancel(&self) {
        self.scope.cancel();
    }

    /// Get the current load state
    pub fn state(&self) -> LoadState {
        self.progress.read().state
    }

    /// Fraction of the tile set loaded so far (0.0 to 1.0)
    ///
    /// Keeps its last value once the run ends, so a run that completed with
    /// failed tiles or was cancelled part-way reports less than 1.0.
    pub fn progress(&self) -> f32 {
        self.progress.read().fraction
    }
}

/// Forwards events to the caller's sink and tracks progress on the way
struct ProgressEvents<E: ?Sized> {
    progress: Arc<RwLock<Progress>>,
    loaded: AtomicUsize,
    total: usize,
    inner: Arc<E>,
}

impl<E: ?Sized> ProgressEvents<E> {
    fn settle(&self, state: LoadState) {
        self.progress.write().state = state;
    }
}

impl<T, E: StreamEvents<T> + ?Sized> StreamEvents<T> for ProgressEvents<E> {
    fn on_tile_loaded(&self, tile: &TileId, texture: T) {
        let loaded = self.loaded.fetch_add(1, Ordering::Relaxed) + 1;
        if self.total > 0 {
            let fraction = loaded as f32 / self.total as f32;
            *self.progress.write() = Progress {
                state: LoadState::Streaming(fraction),
                fraction,
            };
        }
        self.inner.on_tile_loaded(tile, texture);
    }

    fn on_tile_failed(&self, tile: &TileId, cause: &FetchError) {
        self.inner.on_tile_failed(tile, cause);
    }

    fn on_set_complete(&self) {
        self.settle(LoadState::Completed);
        self.inner.on_set_complete();
    }

    fn on_set_cancelled(&self) {
        self.settle(LoadState::Cancelled);
        self.inner.on_set_cancelled();
    }
}

/// One streamed panorama layer: a tile set plus its current load
#[derive(Debug)]
pub struct TiledCubemap {
    name: String,
    division: Division,
    size: f32,
    tiles: Option<TileSet>,
    active: Option<LoadHandle>,
}

impl TiledCubemap {
    /// Create a cubemap of edge `size` split by `division`
    pub fn new(name: impl Into<String>, division: Division, size: f32) -> Self {
        Self {
            name: name.into(),
            division,
            size,
            tiles: Some(TileSet::new(division, size)),
            active: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn division(&self) -> Division {
        self.division
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// The tile set, or `None` while a load holds it
    pub fn tiles(&self) -> Option<&TileSet> {
        self.tiles.as_ref()
    }

    /// The current or last unfinished load
    pub fn active_load(&self) -> Option<&LoadHandle> {
        self.active.as_ref()
    }

    /// Whether a load has been started and not yet collected
    pub fn is_loading(&self) -> bool {
        self.active.is_some()
    }

    /// Spawn `strategy` over this cubemap's tiles
    ///
    /// Returns the new run's cancellation scope. Fails with
    /// [`StreamError::LoadInProgress`] if a previous load is still running; a
    /// previous load that already finished is collected first.
    pub fn start_loading<F, M, E, S>(
        &mut self,
        strategy: Strategy,
        base: impl Into<String>,
        scheduler: Arc<StreamScheduler<F, M>>,
        events: Arc<E>,
        spawner: &S,
    ) -> Result<CancellationScope>
    where
        F: FetchClient + 'static,
        M: PriorityMetric + 'static,
        E: StreamEvents<F::Texture> + ?Sized + 'static,
        S: AsyncSpawner,
    {
        match self.collect_finished() {
            Ok(_) | Err(StreamError::LoadAborted) => {}
            Err(err) => return Err(err),
        }
        if self.active.is_some() {
            return Err(StreamError::LoadInProgress);
        }
        let mut tiles = self.tiles.take().ok_or(StreamError::LoadInProgress)?;

        let base = base.into();
        let scope = CancellationScope::new();
        let initial = tiles.progress();
        let progress = Arc::new(RwLock::new(Progress {
            state: LoadState::Pending,
            fraction: initial,
        }));
        let (tx, rx) = oneshot::channel();
        let name = strategy.name();

        log::info!(
            "{}: starting {} on {} via {}",
            self.name,
            name,
            spawner.runtime_name(),
            base
        );

        let tracker = ProgressEvents {
            progress: Arc::clone(&progress),
            loaded: AtomicUsize::new(tiles.loaded_count()),
            total: tiles.len(),
            inner: events,
        };
        let task_scope = scope.clone();

        let task = spawner.spawn(async move {
            tracker.settle(LoadState::Streaming(initial));
            let outcome = scheduler
                .run(&strategy, &mut tiles, &base, &task_scope, &tracker)
                .await;
            // The receiver may already be gone if the cubemap was dropped.
            let _ = tx.send((tiles, outcome));
        });

        self.active = Some(LoadHandle {
            scope: scope.clone(),
            strategy: name,
            progress,
            result: rx,
            _task: task,
        });
        Ok(scope)
    }

    /// Cancel the running load, if any
    ///
    /// Returns `false` when there was nothing to cancel.
    pub fn stop_loading(&self) -> bool {
        match &self.active {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Wait for the running load and take back the tile set
    pub async fn finish(&mut self) -> Result<LoadOutcome> {
        let handle = self.active.take().ok_or(StreamError::NoActiveLoad)?;
        match handle.result.await {
            Ok((tiles, outcome)) => {
                self.tiles = Some(tiles);
                Ok(outcome)
            }
            Err(_) => Err(self.recover_aborted()),
        }
    }

    /// Cancel the running load, wait for it, then start `strategy` with a fresh scope
    pub async fn restart<F, M, E, S>(
        &mut self,
        strategy: Strategy,
        base: impl Into<String>,
        scheduler: Arc<StreamScheduler<F, M>>,
        events: Arc<E>,
        spawner: &S,
    ) -> Result<CancellationScope>
    where
        F: FetchClient + 'static,
        M: PriorityMetric + 'static,
        E: StreamEvents<F::Texture> + ?Sized + 'static,
        S: AsyncSpawner,
    {
        if self.stop_loading() {
            match self.finish().await {
                Ok(_) | Err(StreamError::LoadAborted) => {}
                Err(err) => return Err(err),
            }
        }
        self.start_loading(strategy, base, scheduler, events, spawner)
    }

    /// Collect a load that has already delivered its outcome, without waiting
    pub fn collect_finished(&mut self) -> Result<Option<LoadOutcome>> {
        let Some(handle) = self.active.as_mut() else {
            return Ok(None);
        };
        match handle.result.try_recv() {
            Ok(Some((tiles, outcome))) => {
                self.active = None;
                self.tiles = Some(tiles);
                Ok(Some(outcome))
            }
            Ok(None) => Ok(None),
            Err(_) => {
                self.active = None;
                Err(self.recover_aborted())
            }
        }
    }

    fn recover_aborted(&mut self) -> StreamError {
        log::warn!(
            "{}: load task dropped before finishing, resetting tiles",
            self.name
        );
        self.tiles = Some(TileSet::new(self.division, self.size));
        StreamError::LoadAborted
    }
}

impl Drop for TiledCubemap {
    fn drop(&mut self) {
        self.stop_loading();
    }
}
