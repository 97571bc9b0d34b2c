use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::tile::TileId;

/// Counters describing what the scheduler has done across runs
#[derive(Debug, Default)]
pub struct StreamMetrics {
    load_times: RwLock<HashMap<TileId, Duration>>,
    fetches_started: AtomicU64,
    fetches_succeeded: AtomicU64,
    fetches_failed: AtomicU64,
    fetches_cancelled: AtomicU64,
    batches: AtomicU64,
    peak_batch_size: AtomicUsize,
}

impl StreamMetrics {
    /// Create a new instance of StreamMetrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a fetch was dispatched
    pub fn record_fetch_started(&self) {
        self.fetches_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful fetch and how long it took
    pub fn record_fetch_succeeded(&self, tile: TileId, duration: Duration) {
        self.fetches_succeeded.fetch_add(1, Ordering::Relaxed);
        self.load_times.write().insert(tile, duration);
    }

    /// Record a failed fetch
    pub fn record_fetch_failed(&self) {
        self.fetches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a fetch that gave up because its run was cancelled
    pub fn record_fetch_cancelled(&self) {
        self.fetches_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one dispatched batch of `size` fetches
    pub fn record_batch(&self, size: usize) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.peak_batch_size.fetch_max(size, Ordering::Relaxed);
    }

    pub fn fetches_started(&self) -> u64 {
        self.fetches_started.load(Ordering::Relaxed)
    }

    pub fn fetches_succeeded(&self) -> u64 {
        self.fetches_succeeded.load(Ordering::Relaxed)
    }

    pub fn fetches_failed(&self) -> u64 {
        self.fetches_failed.load(Ordering::Relaxed)
    }

    pub fn fetches_cancelled(&self) -> u64 {
        self.fetches_cancelled.load(Ordering::Relaxed)
    }

    pub fn batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }

    /// Largest batch dispatched so far
    pub fn peak_batch_size(&self) -> usize {
        self.peak_batch_size.load(Ordering::Relaxed)
    }

    /// Share of settled fetches that failed, as a percentage
    pub fn failure_rate(&self) -> f32 {
        let ok = self.fetches_succeeded() as f32;
        let failed = self.fetches_failed() as f32;

        if ok + failed > 0.0 {
            failed / (ok + failed) * 100.0
        } else {
            0.0
        }
    }

    /// Most recent load time for a tile
    pub fn load_time(&self, tile: &TileId) -> Option<Duration> {
        self.load_times.read().get(tile).cloned()
    }

    /// Mean load time over every successful fetch
    pub fn average_load_time(&self) -> Option<Duration> {
        let times = self.load_times.read();
        if times.is_empty() {
            return None;
        }
        let total: Duration = times.values().sum();
        Some(total / times.len() as u32)
    }
}

/// A thread-safe wrapper around StreamMetrics
#[derive(Debug, Clone, Default)]
pub struct StreamMetricsHandle(Arc<StreamMetrics>);

impl StreamMetricsHandle {
    /// Create a new metrics handle
    pub fn new() -> Self {
        Self(Arc::new(StreamMetrics::new()))
    }

    /// Get a reference to the underlying metrics
    pub fn inner(&self) -> &StreamMetrics {
        &self.0
    }
}

impl std::ops::Deref for StreamMetricsHandle {
    type Target = StreamMetrics;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
