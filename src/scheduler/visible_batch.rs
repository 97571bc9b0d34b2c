use futures::future::join_all;

use super::{LoadOutcome, LoadReport, StreamScheduler};
use crate::cancel::CancellationScope;
use crate::events::StreamEvents;
use crate::loader::FetchClient;
use crate::runtime::{idle, yield_now};
use crate::spatial::{PriorityMetric, ViewpointSource};
use crate::tile_set::TileSet;

impl<F: FetchClient, M: PriorityMetric> StreamScheduler<F, M> {
    /// Fetch the best-ranked tiles inside the peripheral cone, a batch at a time
    ///
    /// Each iteration ranks the remaining tiles against the current viewpoint,
    /// takes the top `concurrency`, and dispatches those scoring above
    /// `cos(fov / 2)` together. Dispatched tiles leave the working set whether
    /// or not their fetch succeeded.
    ///
    /// An iteration that admits nothing waits `poll_interval` (see
    /// [`idle`]) and tries again, so a run only completes once every tile has
    /// entered the cone at some point. With a viewpoint that never turns
    /// towards some tiles, it runs until cancelled.
    pub async fn load_visible_batch_first<V, E>(
        &self,
        tiles: &mut TileSet,
        base: &str,
        viewpoint: &V,
        scope: &CancellationScope,
        events: &E,
    ) -> LoadOutcome
    where
        V: ViewpointSource + ?Sized,
        E: StreamEvents<F::Texture> + ?Sized,
    {
        let threshold = self.config.admission_threshold();
        let ceiling = self.config.concurrency;
        let mut working = tiles.unloaded_indices();
        let mut report = LoadReport::default();

        while !working.is_empty() && !scope.is_cancelled() {
            report.iterations += 1;

            let view = viewpoint.viewpoint();
            let admitted: Vec<usize> = self
                .rank(tiles, &working, &view)
                .into_iter()
                .take(ceiling)
                .filter(|&(_, score)| score > threshold)
                .map(|(index, _)| index)
                .collect();

            if admitted.is_empty() {
                log::trace!(
                    "No tile inside the {}° cone, {} waiting",
                    self.config.peripheral_fov_degrees,
                    working.len()
                );
                idle(self.config.poll_interval).await;
                continue;
            }

            let batch: Vec<(usize, String)> = admitted
                .iter()
                .filter_map(|&index| {
                    tiles
                        .get(index)
                        .map(|tile| (index, self.location(base, tile.id())))
                })
                .collect();

            log::debug!(
                "Dispatching batch of {} tiles ({} remaining)",
                batch.len(),
                working.len()
            );
            self.metrics.record_batch(batch.len());
            report.dispatched += batch.len();

            let mut fetches = Vec::with_capacity(batch.len());
            for (index, location) in batch {
                fetches.push(self.fetch_tile(index, location, scope));
            }
            let settled = join_all(fetches).await;

            for result in settled {
                self.apply(tiles, result, events, &mut report);
            }

            working.retain(|index| !admitted.contains(index));
            yield_now().await;
        }

        self.finish("load-visible-batch-first", tiles, scope, events, report)
    }
}
