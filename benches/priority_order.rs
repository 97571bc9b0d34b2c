//! Benchmark: Tile ranking and scheduling overhead

use cubemap_stream::{
    CancellationScope, Division, MockFetcher, NoopEvents, StreamConfig, StreamScheduler, TileSet,
    Viewpoint,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use futures::executor::block_on;
use glam::Vec3;

fn priority_order_benchmark(c: &mut Criterion) {
    let view = Viewpoint::looking(Vec3::new(0.3, 0.2, 1.0));
    let tiles = TileSet::new(Division::Matrix4x4, 100.0);
    let candidates = tiles.unloaded_indices();

    let scheduler = StreamScheduler::new(MockFetcher::new(), StreamConfig::default()).unwrap();
    c.bench_function("rank_96_tiles", |b| {
        b.iter(|| black_box(scheduler.rank(&tiles, black_box(&candidates), &view)))
    });

    // Latency-free fetches, so this measures the scheduling loop itself
    let wide = StreamConfig::default().with_peripheral_fov(360.0);
    c.bench_function("visible_batch_96_tiles", |b| {
        b.iter(|| {
            let scheduler =
                StreamScheduler::new(MockFetcher::new().with_latency_polls(0), wide.clone())
                    .unwrap();
            let mut tiles = TileSet::new(Division::Matrix4x4, 100.0);
            let outcome = block_on(scheduler.load_visible_batch_first(
                &mut tiles,
                "env",
                &view,
                &CancellationScope::new(),
                &NoopEvents,
            ));
            black_box(outcome)
        })
    });

    c.bench_function("load_all_96_tiles", |b| {
        b.iter(|| {
            let scheduler = StreamScheduler::new(
                MockFetcher::new().with_latency_polls(0),
                StreamConfig::default(),
            )
            .unwrap();
            let mut tiles = TileSet::new(Division::Matrix4x4, 100.0);
            black_box(block_on(scheduler.load_all(
                &mut tiles,
                "env",
                &CancellationScope::new(),
                &NoopEvents,
            )))
        })
    });
}

criterion_group!(benches, priority_order_benchmark);
criterion_main!(benches);
