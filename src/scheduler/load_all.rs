use futures::stream::{FuturesUnordered, StreamExt};

use super::{LoadOutcome, LoadReport, StreamScheduler};
use crate::cancel::CancellationScope;
use crate::events::StreamEvents;
use crate::loader::FetchClient;
use crate::spatial::PriorityMetric;
use crate::tile_set::TileSet;

impl<F: FetchClient, M: PriorityMetric> StreamScheduler<F, M> {
    /// Fetch every unloaded tile with at most `concurrency` fetches in flight
    ///
    /// Tiles are dispatched in index order as slots free up. Once cancelled, no
    /// further fetch is dispatched; those already running are awaited and
    /// applied, then `on_set_cancelled` fires instead of `on_set_complete`.
    pub async fn load_all<E>(
        &self,
        tiles: &mut TileSet,
        base: &str,
        scope: &CancellationScope,
        events: &E,
    ) -> LoadOutcome
    where
        E: StreamEvents<F::Texture> + ?Sized,
    {
        let jobs: Vec<(usize, String)> = tiles
            .unloaded_indices()
            .into_iter()
            .filter_map(|index| {
                tiles
                    .get(index)
                    .map(|tile| (index, self.location(base, tile.id())))
            })
            .collect();

        log::debug!(
            "load-all: {} of {} tiles pending, concurrency {}",
            jobs.len(),
            tiles.len(),
            self.config.concurrency
        );

        let mut report = LoadReport::default();
        if !jobs.is_empty() {
            report.iterations = 1;
            self.metrics.record_batch(jobs.len().min(self.config.concurrency));
        }

        let mut queue = jobs.into_iter();
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < self.config.concurrency && !scope.is_cancelled() {
                let Some((index, location)) = queue.next() else {
                    break;
                };
                report.dispatched += 1;
                in_flight.push(self.fetch_tile(index, location, scope));
            }

            match in_flight.next().await {
                Some(settled) => self.apply(tiles, settled, events, &mut report),
                None => break,
            }
        }

        self.finish("load-all", tiles, scope, events, report)
    }
}
