//! Mock fetch client for testing
//!
//! Records every requested location, tracks how many fetches overlap, and fails
//! whichever tiles it is told to. Clones share their records, so a test can keep
//! one clone for assertions while the scheduler owns another.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{FetchClient, FetchError};
use crate::cancel::CancellationScope;
use crate::runtime::yield_now;

type FetchHook = dyn Fn(&str) + Send + Sync;

/// Texture produced by [`MockFetcher`]: just the location it was fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTexture {
    pub location: String,
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Scripted fetch client
#[derive(Clone)]
pub struct MockFetcher {
    failing: Arc<HashSet<String>>,
    latency_polls: usize,
    observe_cancellation: bool,
    hook: Option<Arc<FetchHook>>,
    state: Arc<MockState>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockFetcher")
            .field("failing", &self.failing)
            .field("latency_polls", &self.latency_polls)
            .field("observe_cancellation", &self.observe_cancellation)
            .field("requests", &self.request_count())
            .finish()
    }
}

impl MockFetcher {
    /// Create a mock fetcher where every fetch succeeds after a couple of yields
    pub fn new() -> Self {
        Self {
            failing: Arc::new(HashSet::new()),
            latency_polls: 2,
            observe_cancellation: false,
            hook: None,
            state: Arc::new(MockState::default()),
        }
    }

    /// Fail every fetch for the tile with this id (e.g. `"2_512_0_0"`)
    pub fn with_failure(mut self, tile_id: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.failing).insert(tile_id.into());
        self
    }

    /// Number of times each fetch yields before settling
    pub fn with_latency_polls(mut self, polls: usize) -> Self {
        self.latency_polls = polls;
        self
    }

    /// Give up with [`FetchError::Cancelled`] if the scope fires mid-fetch
    pub fn observing_cancellation(mut self) -> Self {
        self.observe_cancellation = true;
        self
    }

    /// Run `hook` with the location at the start of every fetch
    pub fn with_hook(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        let hook: Arc<FetchHook> = Arc::new(hook);
        self.hook = Some(hook);
        self
    }

    /// Locations requested so far, in dispatch order
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().len()
    }

    /// Largest number of fetches that were outstanding at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.state.peak_in_flight.load(Ordering::SeqCst)
    }

    fn fails(&self, location: &str) -> bool {
        self.failing
            .iter()
            .any(|id| location.contains(&format!("_{id}.")))
    }
}

#[async_trait::async_trait]
impl FetchClient for MockFetcher {
    type Texture = MockTexture;

    async fn fetch(
        &self,
        location: &str,
        scope: &CancellationScope,
    ) -> Result<MockTexture, FetchError> {
        self.state.requests.lock().push(location.to_string());
        if let Some(hook) = &self.hook {
            (**hook)(location);
        }

        let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let mut cancelled = false;
        for _ in 0..self.latency_polls {
            yield_now().await;
            if self.observe_cancellation && scope.is_cancelled() {
                cancelled = true;
                break;
            }
        }

        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);

        if cancelled {
            return Err(FetchError::Cancelled(location.to_string()));
        }
        if self.fails(location) {
            return Err(FetchError::network(location, "simulated network error"));
        }
        Ok(MockTexture {
            location: location.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_mock_fetch_records_requests() {
        let fetcher = MockFetcher::new();
        let scope = CancellationScope::new();

        let texture = block_on(fetcher.fetch("env_0_512_0_0.jpg", &scope)).unwrap();
        assert_eq!(texture.location, "env_0_512_0_0.jpg");
        assert_eq!(fetcher.requests(), vec!["env_0_512_0_0.jpg".to_string()]);
    }

    #[test]
    fn test_mock_failure_matches_tile_id_only() {
        let fetcher = MockFetcher::new().with_failure("2_512_0_0");
        let scope = CancellationScope::new();

        assert!(block_on(fetcher.fetch("env_2_512_0_0.jpg", &scope)).is_err());
        assert!(block_on(fetcher.fetch("env_2_512_0_01.jpg", &scope)).is_ok());
    }

    #[test]
    fn test_mock_tracks_overlap() {
        let fetcher = MockFetcher::new().with_latency_polls(3);
        let scope = CancellationScope::new();

        block_on(futures::future::join_all(vec![
            fetcher.fetch("a_0_512_0_0.jpg", &scope),
            fetcher.fetch("a_1_512_0_0.jpg", &scope),
            fetcher.fetch("a_2_512_0_0.jpg", &scope),
        ]));
        assert_eq!(fetcher.peak_in_flight(), 3);
    }

    #[test]
    fn test_mock_observes_cancellation() {
        let scope = CancellationScope::new();
        let trigger = scope.clone();
        let fetcher = MockFetcher::new()
            .observing_cancellation()
            .with_hook(move |_| {
                trigger.cancel();
            });

        let result = block_on(fetcher.fetch("a_0_512_0_0.jpg", &scope));
        assert!(matches!(result, Err(FetchError::Cancelled(_))));
    }
}
