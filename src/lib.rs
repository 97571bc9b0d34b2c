//! cubemap_stream - View-prioritised streaming of tiled cubemap panoramas
//!
//! # Features
//! - Cube faces split into 1×1, 2×2 or 4×4 tile grids
//! - Three loading strategies: load-all, load-by-priority, visible-batch-first
//! - Bounded fetch concurrency with cooperative cancellation
//! - Async runtime abstraction (Tokio or mock)
//! - Pluggable fetch clients (local files, HTTP, scripted mock)
//!
//! # Quick Start
//!
//! ```ignore
//! use cubemap_stream::{PanoramaConfig, PanoramaSession, SharedViewpoint, TokioSpawner};
//!
//! let mut session = PanoramaSession::new(PanoramaConfig::new("https://cdn.example/envs/", "lobby"))?;
//! let viewpoint = Arc::new(SharedViewpoint::default());
//! session.start(HttpFetcher::new()?, viewpoint.clone(), Arc::new(NoopEvents), &TokioSpawner::new())?;
//! viewpoint.look(camera_forward);
//! let (low, high) = session.finish().await?;
//! ```
//!
//! # Feature Flags
//!
//! - `runtime-tokio`: Enable Tokio async runtime
//! - `http`: Enable the reqwest-based HTTP fetch client (implies `runtime-tokio`)

// Core modules
pub mod loader;
pub mod runtime;
pub mod scheduler;
pub mod spatial;

// Support modules
pub mod async_loading;
pub mod cancel;
pub mod config;
pub mod events;
pub mod metrics;
pub mod panorama;
pub mod texture;
pub mod tile;
pub mod tile_set;

// Error types
mod error;
pub use error::{Result, StreamError};

// Re-export tile types
pub use tile::{CubeFace, Division, FaceBasis, Tile, TileId, TILE_RESOLUTION};
pub use tile_set::TileSet;

// Re-export scheduling types
pub use cancel::CancellationScope;
pub use config::{PanoramaConfig, StreamConfig};
pub use events::{NoopEvents, RecordedEvent, RecordingEvents, StreamEvents};
pub use metrics::{StreamMetrics, StreamMetricsHandle};
pub use scheduler::{LoadOutcome, LoadReport, Strategy, StreamScheduler};

// Re-export fetch types
#[cfg(feature = "http")]
pub use loader::HttpFetcher;
pub use loader::{tile_location, FetchClient, FetchError, FileFetcher, MockFetcher, MockTexture};

// Re-export runtime types
pub use runtime::mock::MockSpawner;
#[cfg(feature = "runtime-tokio")]
pub use runtime::tokio_impl::TokioSpawner;
pub use runtime::{yield_now, AsyncSpawner, JoinHandle};

// Re-export texture types
pub use texture::{TextureDecoder, TextureError, TextureFormat, TileTexture};

// Re-export spatial types
pub use spatial::{
    admission_threshold, CosinePriority, PriorityMetric, SharedViewpoint, Viewpoint,
    ViewpointSource,
};

// Re-export async loading types
pub use async_loading::{LoadHandle, LoadState, TiledCubemap};
pub use panorama::PanoramaSession;

// Version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
