//! Integration tests for the load-all strategy

use cubemap_stream::{
    CancellationScope, CubeFace, Division, FetchError, MockFetcher, MockTexture, RecordedEvent,
    RecordingEvents, StreamConfig, StreamScheduler, TileId, TileSet,
};
use futures::executor::block_on;

#[test]
fn test_every_tile_loads_and_completion_fires_once() {
    let fetcher = MockFetcher::new();
    let scheduler = StreamScheduler::new(fetcher.clone(), StreamConfig::default()).unwrap();
    let mut tiles = TileSet::new(Division::Matrix1x1, 100.01);
    let events = RecordingEvents::<MockTexture>::new();

    let outcome = block_on(scheduler.load_all(
        &mut tiles,
        "https://cdn.example/envs/lobby",
        &CancellationScope::new(),
        &events,
    ));

    assert!(outcome.is_completed());
    assert!(tiles.is_fully_loaded());
    assert_eq!(events.loaded_tiles().len(), 6);
    assert_eq!(events.completions(), 1);
    assert_eq!(events.cancellations(), 0);

    // Completion is always the last event
    assert_eq!(events.events().last(), Some(&RecordedEvent::SetComplete));

    let mut requested = fetcher.requests();
    requested.sort();
    assert_eq!(requested[0], "https://cdn.example/envs/lobby_0_512_0_0.jpg");
    assert_eq!(requested[5], "https://cdn.example/envs/lobby_5_512_0_0.jpg");
}

#[test]
fn test_failed_tile_stays_unloaded() {
    let fetcher = MockFetcher::new().with_failure("2_512_0_0");
    let scheduler = StreamScheduler::new(fetcher.clone(), StreamConfig::default()).unwrap();
    let mut tiles = TileSet::new(Division::Matrix1x1, 10.0);
    let events = RecordingEvents::<MockTexture>::new();

    let outcome = block_on(scheduler.load_all(
        &mut tiles,
        "env",
        &CancellationScope::new(),
        &events,
    ));

    let back = TileId {
        face: CubeFace::Back,
        resolution: 512,
        row: 0,
        col: 0,
    };

    assert!(outcome.is_completed());
    assert_eq!(outcome.report().loaded, 5);
    assert_eq!(outcome.report().failed, vec![back]);
    assert_eq!(tiles.loaded_count(), 5);
    assert!(!tiles.find(&back).unwrap().is_loaded());
    assert_eq!(events.failed_tiles(), vec![back]);
    assert_eq!(events.completions(), 1);
    assert_eq!(fetcher.request_count(), 6);

    let failure = events.events().into_iter().find_map(|event| match event {
        RecordedEvent::TileFailed(_, cause) => Some(cause),
        _ => None,
    });
    assert!(matches!(failure, Some(FetchError::Network { .. })));
    assert_eq!(scheduler.metrics().fetches_failed(), 1);
}

#[test]
fn test_single_slot_dispatches_in_index_order() {
    let fetcher = MockFetcher::new();
    let config = StreamConfig::default()
        .with_concurrency(1)
        .with_extension("png");
    let scheduler = StreamScheduler::new(fetcher.clone(), config).unwrap();
    let mut tiles = TileSet::new(Division::Matrix1x1, 10.0);
    let events = RecordingEvents::<MockTexture>::new();

    block_on(scheduler.load_all(&mut tiles, "env", &CancellationScope::new(), &events));

    let expected: Vec<String> = (0..6).map(|face| format!("env_{face}_512_0_0.png")).collect();
    assert_eq!(fetcher.requests(), expected);
    assert_eq!(fetcher.peak_in_flight(), 1);
}

#[test]
fn test_ceiling_holds_for_large_sets() {
    let fetcher = MockFetcher::new().with_latency_polls(6);
    let scheduler =
        StreamScheduler::new(fetcher.clone(), StreamConfig::default().with_concurrency(8))
            .unwrap();
    let mut tiles = TileSet::new(Division::Matrix4x4, 100.0);
    let events = RecordingEvents::<MockTexture>::new();

    let outcome = block_on(scheduler.load_all(
        &mut tiles,
        "env",
        &CancellationScope::new(),
        &events,
    ));

    assert!(outcome.is_completed());
    assert_eq!(fetcher.request_count(), 96);
    assert_eq!(fetcher.peak_in_flight(), 8);
    assert_eq!(scheduler.metrics().fetches_succeeded(), 96);
    assert!(tiles.is_fully_loaded());
}

#[test]
fn test_partially_loaded_set_only_fetches_the_rest() {
    let fetcher = MockFetcher::new().with_failure("4_512_0_0");
    let scheduler = StreamScheduler::new(fetcher.clone(), StreamConfig::default()).unwrap();
    let mut tiles = TileSet::new(Division::Matrix1x1, 10.0);
    let events = RecordingEvents::<MockTexture>::new();
    let scope = CancellationScope::new();

    block_on(scheduler.load_all(&mut tiles, "env", &scope, &events));
    let outcome = block_on(scheduler.load_all(&mut tiles, "env", &scope, &events));

    // Only the failed tile is attempted again
    assert_eq!(outcome.report().dispatched, 1);
    assert_eq!(fetcher.request_count(), 7);
    assert_eq!(fetcher.requests()[6], "env_4_512_0_0.jpg");
}
