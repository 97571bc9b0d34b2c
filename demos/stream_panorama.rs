//! Panorama streaming example
//!
//! Streams both layers of a panorama and prints every tile as it arrives.
//!
//! ```text
//! cargo run --example stream_panorama                 # scripted tiles
//! cargo run --example stream_panorama -- ./envs lobby # tiles from disk
//! ```
//!
//! Local tiles are expected at `<dir>/<env>_<face>_<resolution>_<row>_<col>.jpg`.

use std::sync::Arc;

use cubemap_stream::{
    FetchClient, FetchError, FileFetcher, MockFetcher, MockSpawner, PanoramaConfig,
    PanoramaSession, StreamConfig, StreamEvents, TileId, Viewpoint,
};
use futures::executor::block_on;
use glam::Vec3;

/// Prints each event as it happens
struct ConsoleEvents;

impl<T> StreamEvents<T> for ConsoleEvents {
    fn on_tile_loaded(&self, tile: &TileId, _texture: T) {
        println!("  loaded  {tile}");
    }

    fn on_tile_failed(&self, tile: &TileId, cause: &FetchError) {
        println!("  failed  {tile}: {cause}");
    }

    fn on_set_complete(&self) {
        println!("  -- layer complete");
    }

    fn on_set_cancelled(&self) {
        println!("  -- layer cancelled");
    }
}

fn stream<F: FetchClient + 'static>(config: PanoramaConfig, fetcher: F) -> anyhow::Result<()> {
    let mut session = PanoramaSession::new(config)?;

    // Slightly off-axis so no tile sits exactly behind the viewer
    let viewpoint = Arc::new(Viewpoint::looking(Vec3::new(0.3, 0.2, 1.0)));
    session.start(
        fetcher,
        viewpoint,
        Arc::new(ConsoleEvents),
        &MockSpawner::blocking(),
    )?;

    let (low, high) = block_on(session.finish())?;
    for (name, outcome) in [
        (session.low_res().name(), &low),
        (session.high_res().name(), &high),
    ] {
        let report = outcome.report();
        println!(
            "{name}: {} loaded, {} failed in {} iterations",
            report.loaded,
            report.failed.len(),
            report.iterations
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    println!("cubemap_stream Panorama Demo");
    println!("============================\n");

    // A full cone lets the detailed layer finish without the viewer turning
    let stream_config = StreamConfig::default().with_peripheral_fov(360.0);
    let mut args = std::env::args().skip(1);

    match (args.next(), args.next()) {
        (Some(dir), env) => {
            let env = env.unwrap_or_else(|| "lobby".to_string());
            let config = PanoramaConfig::new("", env).with_stream(stream_config);
            println!("Streaming {} from {dir}\n", config.base_path());
            stream(config, FileFetcher::with_root(dir))
        }
        (None, _) => {
            let config = PanoramaConfig::new("mock://envs/", "lobby").with_stream(stream_config);
            println!("Streaming {} from a scripted fetcher\n", config.base_path());
            stream(config, MockFetcher::new().with_failure("2_2048_1_1"))
        }
    }
}
