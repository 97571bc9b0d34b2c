//! Recording event sink for testing
//!
//! Keeps every callback in arrival order. Clones share the same log.

use std::sync::Arc;

use parking_lot::Mutex;

use super::StreamEvents;
use crate::loader::FetchError;
use crate::tile::TileId;

/// One callback received by [`RecordingEvents`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent<T> {
    TileLoaded(TileId, T),
    TileFailed(TileId, FetchError),
    SetComplete,
    SetCancelled,
}

/// Event sink that records what it receives
#[derive(Debug)]
pub struct RecordingEvents<T> {
    log: Arc<Mutex<Vec<RecordedEvent<T>>>>,
}

impl<T> Clone for RecordingEvents<T> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
        }
    }
}

impl<T> Default for RecordingEvents<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordingEvents<T> {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Ids of loaded tiles in arrival order
    pub fn loaded_tiles(&self) -> Vec<TileId> {
        self.log
            .lock()
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::TileLoaded(id, _) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Ids of failed tiles in arrival order
    pub fn failed_tiles(&self) -> Vec<TileId> {
        self.log
            .lock()
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::TileFailed(id, _) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// How many times `on_set_complete` fired
    pub fn completions(&self) -> usize {
        self.count(|event| matches!(event, RecordedEvent::SetComplete))
    }

    /// How many times `on_set_cancelled` fired
    pub fn cancellations(&self) -> usize {
        self.count(|event| matches!(event, RecordedEvent::SetCancelled))
    }

    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }

    fn count(&self, pred: impl Fn(&RecordedEvent<T>) -> bool) -> usize {
        self.log.lock().iter().filter(|event| pred(event)).count()
    }
}

impl<T: Clone> RecordingEvents<T> {
    /// Snapshot of every recorded event
    pub fn events(&self) -> Vec<RecordedEvent<T>> {
        self.log.lock().clone()
    }
}

impl<T: Send> StreamEvents<T> for RecordingEvents<T> {
    fn on_tile_loaded(&self, tile: &TileId, texture: T) {
        self.log
            .lock()
            .push(RecordedEvent::TileLoaded(*tile, texture));
    }

    fn on_tile_failed(&self, tile: &TileId, cause: &FetchError) {
        self.log
            .lock()
            .push(RecordedEvent::TileFailed(*tile, cause.clone()));
    }

    fn on_set_complete(&self) {
        self.log.lock().push(RecordedEvent::SetComplete);
    }

    fn on_set_cancelled(&self) {
        self.log.lock().push(RecordedEvent::SetCancelled);
    }
}
