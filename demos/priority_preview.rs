//! Priority preview example
//!
//! Shows which tiles each strategy would fetch first for a given gaze direction.

use std::sync::atomic::{AtomicUsize, Ordering};

use cubemap_stream::{
    CancellationScope, Division, MockFetcher, MockTexture, RecordingEvents, StreamConfig,
    StreamScheduler, TileSet, Viewpoint,
};
use futures::executor::block_on;
use glam::Vec3;

fn main() -> anyhow::Result<()> {
    println!("cubemap_stream Priority Preview");
    println!("===============================\n");

    let view = Viewpoint::looking(Vec3::new(0.4, 0.1, 1.0));
    let config = StreamConfig::default().with_concurrency(4);
    let threshold = config.admission_threshold();

    println!("Gaze direction: {:?}", view.forward);
    println!(
        "Peripheral cone: {}° (admission score > {:.3})\n",
        config.peripheral_fov_degrees, threshold
    );

    let tiles = TileSet::new(Division::Matrix4x4, 100.0);
    let scheduler = StreamScheduler::new(MockFetcher::new(), config)?;

    println!("Top 8 tiles by priority:");
    let ranked = scheduler.rank(&tiles, &tiles.unloaded_indices(), &view);
    for (rank, (index, score)) in ranked.iter().take(8).enumerate() {
        if let Some(tile) = tiles.get(*index) {
            let marker = if *score > threshold { "visible" } else { "outside" };
            println!(
                "  {:>2}. {:<12} {:.3} ({marker})",
                rank + 1,
                tile.id().to_string(),
                score
            );
        }
    }

    println!("\nFirst visible batches:");
    let scope = CancellationScope::new();
    let trigger = scope.clone();
    let batch_size = scheduler.config().concurrency;
    // Cancel while the third batch is in flight; the rest never enter the cone anyway
    let started = AtomicUsize::new(0);
    let fetcher = MockFetcher::new().with_hook(move |_| {
        if started.fetch_add(1, Ordering::SeqCst) + 1 == 3 * batch_size {
            trigger.cancel();
        }
    });
    let scheduler = StreamScheduler::new(fetcher.clone(), scheduler.config().clone())?;
    let mut tiles = TileSet::new(Division::Matrix4x4, 100.0);
    let events = RecordingEvents::<MockTexture>::new();

    let outcome = block_on(scheduler.load_visible_batch_first(
        &mut tiles,
        "lobby",
        &view,
        &scope,
        &events,
    ));

    for (i, location) in fetcher.requests().iter().enumerate() {
        println!("  {:>2}. {}", i + 1, location);
    }
    println!(
        "\n{} batches, {} tiles loaded, cancelled: {}",
        scheduler.metrics().batches(),
        tiles.loaded_count(),
        outcome.is_cancelled()
    );

    Ok(())
}
