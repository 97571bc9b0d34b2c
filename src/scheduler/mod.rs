//! Tile streaming scheduler
//!
//! [`StreamScheduler`] decides which tiles of a [`TileSet`] to fetch, in what
//! order and how many at once. Three strategies are provided:
//!
//! - [`load_all`](StreamScheduler::load_all): every unloaded tile, no ordering,
//!   at most `concurrency` in flight.
//! - [`load_by_priority`](StreamScheduler::load_by_priority): one tile at a time,
//!   always the one closest to the centre of view.
//! - [`load_visible_batch_first`](StreamScheduler::load_visible_batch_first):
//!   batches of the best-ranked tiles that fall inside the peripheral cone.
//!
//! Fetch futures only return results. Tile state is updated by the strategy
//! loop itself, so the scheduler needs no locking around the tile set.
//!
//! Cancellation is cooperative. The scope is checked at the top of every
//! iteration and before every dispatch, and is passed into every fetch; a fetch
//! that has been dispatched is always awaited to completion.

mod by_priority;
mod load_all;
mod visible_batch;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cancel::CancellationScope;
use crate::config::StreamConfig;
use crate::error::Result;
use crate::events::StreamEvents;
use crate::loader::{tile_location, FetchClient, FetchError};
use crate::metrics::StreamMetricsHandle;
use crate::spatial::{CosinePriority, PriorityMetric, Viewpoint, ViewpointSource};
use crate::tile::TileId;
use crate::tile_set::TileSet;

/// Which loading strategy a background load should run
#[derive(Clone)]
pub enum Strategy {
    /// Fetch everything, no ordering
    All,
    /// Fetch the single most central tile, one at a time
    ByPriority(Arc<dyn ViewpointSource>),
    /// Fetch batches of central tiles inside the peripheral cone
    VisibleBatchFirst(Arc<dyn ViewpointSource>),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::All => "load-all",
            Strategy::ByPriority(_) => "load-by-priority",
            Strategy::VisibleBatchFirst(_) => "load-visible-batch-first",
        }
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Summary of one loading run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Fetches dispatched
    pub dispatched: usize,
    /// Tiles that became loaded
    pub loaded: usize,
    /// Tiles whose fetch failed, in settle order
    pub failed: Vec<TileId>,
    /// Fetches that gave up because the run was cancelled
    pub abandoned: usize,
    /// Scheduling iterations (batches or single picks, including empty ones)
    pub iterations: usize,
}

/// How a loading run ended
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Every tile the strategy could attempt has settled
    Completed(LoadReport),
    /// The scope was cancelled before the run finished
    Cancelled(LoadReport),
}

impl LoadOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, LoadOutcome::Completed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadOutcome::Cancelled(_))
    }

    pub fn report(&self) -> &LoadReport {
        match self {
            LoadOutcome::Completed(report) | LoadOutcome::Cancelled(report) => report,
        }
    }
}

/// A fetch that has finished, waiting to be applied to its tile
struct Settled<T> {
    index: usize,
    result: std::result::Result<T, FetchError>,
    elapsed: Duration,
}

/// Prioritised, bounded, cancellable tile loader
#[derive(Debug)]
pub struct StreamScheduler<F, M = CosinePriority> {
    fetcher: F,
    metric: M,
    config: StreamConfig,
    metrics: StreamMetricsHandle,
}

impl<F: FetchClient> StreamScheduler<F, CosinePriority> {
    /// Create a scheduler using the cosine priority metric
    pub fn new(fetcher: F, config: StreamConfig) -> Result<Self> {
        Self::with_metric(fetcher, CosinePriority::new(), config)
    }
}

impl<F: FetchClient, M: PriorityMetric> StreamScheduler<F, M> {
    /// Create a scheduler with a custom priority metric
    pub fn with_metric(fetcher: F, metric: M, config: StreamConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fetcher,
            metric,
            config,
            metrics: StreamMetricsHandle::new(),
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Performance counters shared across every run of this scheduler
    pub fn metrics(&self) -> &StreamMetricsHandle {
        &self.metrics
    }

    /// Location the scheduler requests for `tile`
    pub fn location(&self, base: &str, tile: &TileId) -> String {
        tile_location(base, tile, &self.config.extension)
    }

    /// Run whichever strategy `strategy` names
    pub async fn run<E>(
        &self,
        strategy: &Strategy,
        tiles: &mut TileSet,
        base: &str,
        scope: &CancellationScope,
        events: &E,
    ) -> LoadOutcome
    where
        E: StreamEvents<F::Texture> + ?Sized,
    {
        match strategy {
            Strategy::All => self.load_all(tiles, base, scope, events).await,
            Strategy::ByPriority(view) => {
                self.load_by_priority(tiles, base, view.as_ref(), scope, events)
                    .await
            }
            Strategy::VisibleBatchFirst(view) => {
                self.load_visible_batch_first(tiles, base, view.as_ref(), scope, events)
                    .await
            }
        }
    }

    /// Score `candidates` against `viewpoint`, best first
    ///
    /// The sort is stable, so equal scores keep the order of `candidates`.
    pub fn rank(
        &self,
        tiles: &TileSet,
        candidates: &[usize],
        viewpoint: &Viewpoint,
    ) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = candidates
            .iter()
            .filter_map(|&index| {
                tiles
                    .get(index)
                    .map(|tile| (index, self.metric.score(tile.position(), viewpoint)))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    async fn fetch_tile(
        &self,
        index: usize,
        location: String,
        scope: &CancellationScope,
    ) -> Settled<F::Texture> {
        self.metrics.record_fetch_started();
        log::debug!("Fetching tile from {location}");

        let started = Instant::now();
        let result = self.fetcher.fetch(&location, scope).await;

        Settled {
            index,
            result,
            elapsed: started.elapsed(),
        }
    }

    fn apply<E>(
        &self,
        tiles: &mut TileSet,
        settled: Settled<F::Texture>,
        events: &E,
        report: &mut LoadReport,
    ) where
        E: StreamEvents<F::Texture> + ?Sized,
    {
        let Some(id) = tiles.get(settled.index).map(|tile| *tile.id()) else {
            return;
        };

        match settled.result {
            Ok(texture) => {
                tiles.mark_loaded(settled.index);
                self.metrics.record_fetch_succeeded(id, settled.elapsed);
                report.loaded += 1;
                events.on_tile_loaded(&id, texture);
            }
            Err(err) if err.is_cancelled() => {
                log::debug!("Tile {id} abandoned: {err}");
                self.metrics.record_fetch_cancelled();
                report.abandoned += 1;
            }
            Err(err) => {
                log::warn!("Failed to load tile {id}: {err}");
                self.metrics.record_fetch_failed();
                report.failed.push(id);
                events.on_tile_failed(&id, &err);
            }
        }
    }

    fn finish<E>(
        &self,
        strategy: &str,
        tiles: &TileSet,
        scope: &CancellationScope,
        events: &E,
        report: LoadReport,
    ) -> LoadOutcome
    where
        E: StreamEvents<F::Texture> + ?Sized,
    {
        if scope.is_cancelled() {
            log::info!(
                "{strategy} cancelled after {} fetches ({}/{} tiles loaded)",
                report.dispatched,
                tiles.loaded_count(),
                tiles.len()
            );
            events.on_set_cancelled();
            LoadOutcome::Cancelled(report)
        } else {
            log::info!(
                "{strategy} finished: {}/{} tiles loaded, {} failed",
                tiles.loaded_count(),
                tiles.len(),
                report.failed.len()
            );
            events.on_set_complete();
            LoadOutcome::Completed(report)
        }
    }
}
