//! Callbacks from the scheduler to the rendering collaborator
//!
//! The scheduler never builds or touches visual objects. It reports results
//! through [`StreamEvents`]; the host applies the texture to the tile's quad and
//! makes it visible in `on_tile_loaded`.

pub mod mock;

use std::sync::Arc;

use crate::loader::FetchError;
use crate::tile::TileId;

// Re-export implementations
pub use mock::{RecordedEvent, RecordingEvents};

/// Receiver of per-tile and whole-set loading events
///
/// All methods default to doing nothing. Calls for tiles in the same batch may
/// arrive in any order. Exactly one of `on_set_complete` and
/// `on_set_cancelled` is called per run.
pub trait StreamEvents<T>: Send + Sync {
    /// A tile's texture arrived; apply it and show the tile
    fn on_tile_loaded(&self, _tile: &TileId, _texture: T) {}

    /// A tile's fetch failed; the tile stays hidden for this run
    fn on_tile_failed(&self, _tile: &TileId, _cause: &FetchError) {}

    /// The run finished without being cancelled
    fn on_set_complete(&self) {}

    /// The run stopped because its scope was cancelled
    fn on_set_cancelled(&self) {}
}

/// Event sink that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvents;

impl<T> StreamEvents<T> for NoopEvents {}

impl<T, E: StreamEvents<T> + ?Sized> StreamEvents<T> for Arc<E> {
    fn on_tile_loaded(&self, tile: &TileId, texture: T) {
        (**self).on_tile_loaded(tile, texture)
    }

    fn on_tile_failed(&self, tile: &TileId, cause: &FetchError) {
        (**self).on_tile_failed(tile, cause)
    }

    fn on_set_complete(&self) {
        (**self).on_set_complete()
    }

    fn on_set_cancelled(&self) {
        (**self).on_set_cancelled()
    }
}
