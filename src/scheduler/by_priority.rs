use super::{LoadOutcome, LoadReport, StreamScheduler};
use crate::cancel::CancellationScope;
use crate::events::StreamEvents;
use crate::loader::FetchClient;
use crate::runtime::yield_now;
use crate::spatial::{PriorityMetric, Viewpoint, ViewpointSource};
use crate::tile_set::TileSet;

impl<F: FetchClient, M: PriorityMetric> StreamScheduler<F, M> {
    /// Fetch tiles one at a time, always the most central remaining tile
    ///
    /// The viewpoint is read again before every pick, so turning the camera
    /// changes what loads next. Ties go to the lowest tile index. Each tile is
    /// attempted at most once per run; a failed tile is not picked again.
    pub async fn load_by_priority<V, E>(
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
        let mut candidates = tiles.unloaded_indices();
        let mut report = LoadReport::default();

        while !scope.is_cancelled() {
            let view = viewpoint.viewpoint();
            let Some(pick) = self.select_best(tiles, &candidates, &view) else {
                break;
            };
            let index = candidates.remove(pick);
            let Some(location) = tiles.get(index).map(|tile| self.location(base, tile.id()))
            else {
                continue;
            };

            report.iterations += 1;
            report.dispatched += 1;
            self.metrics.record_batch(1);

            let settled = self.fetch_tile(index, location, scope).await;
            self.apply(tiles, settled, events, &mut report);

            yield_now().await;
        }

        self.finish("load-by-priority", tiles, scope, events, report)
    }

    /// Position in `candidates` of the highest-scoring tile, first seen on ties
    fn select_best(
        &self,
        tiles: &TileSet,
        candidates: &[usize],
        viewpoint: &Viewpoint,
    ) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;

        for (pos, &index) in candidates.iter().enumerate() {
            let Some(tile) = tiles.get(index) else {
                continue;
            };
            let score = self.metric.score(tile.position(), viewpoint);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((pos, score)),
            }
        }

        best.map(|(pos, _)| pos)
    }
}
