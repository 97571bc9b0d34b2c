//! HTTP fetch client backed by reqwest
//!
//! Requests run on the Tokio runtime. While a request is outstanding the
//! cancellation scope is polled every `poll_interval`; if it fires, the request
//! future is dropped and the fetch reports [`FetchError::Cancelled`].

use std::time::Duration;

use super::{FetchClient, FetchError};
use crate::cancel::CancellationScope;
use crate::config::{StreamConfig, DEFAULT_POLL_INTERVAL};
use crate::texture::{TextureDecoder, TileTexture};

/// Default timeout for a single tile request
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches tiles over HTTP(S) and decodes them
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    poll_interval: Duration,
    decoder: TextureDecoder,
}

impl HttpFetcher {
    /// Create a fetcher with default timeout and poll interval
    pub fn new() -> Result<Self, FetchError> {
        Self::with_poll_interval(DEFAULT_POLL_INTERVAL)
    }

    /// Create a fetcher polling for cancellation at `config.poll_interval`
    pub fn from_config(config: &StreamConfig) -> Result<Self, FetchError> {
        Self::with_poll_interval(config.poll_interval)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Create a fetcher that checks for cancellation every `poll_interval`
    pub fn with_poll_interval(poll_interval: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| FetchError::network("<client>", e))?;

        Ok(Self {
            client,
            poll_interval,
            decoder: TextureDecoder::new(),
        })
    }

    async fn download(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(location)
            .send()
            .await
            .map_err(|e| FetchError::network(location, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::network(location, e))?;
        Ok(body.to_vec())
    }

    async fn wait_cancelled(&self, scope: &CancellationScope) {
        while !scope.is_cancelled() {
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait::async_trait]
impl FetchClient for HttpFetcher {
    type Texture = TileTexture;

    async fn fetch(
        &self,
        location: &str,
        scope: &CancellationScope,
    ) -> Result<TileTexture, FetchError> {
        if scope.is_cancelled() {
            return Err(FetchError::Cancelled(location.to_string()));
        }

        let data = tokio::select! {
            result = self.download(location) => result?,
            _ = self.wait_cancelled(scope) => {
                log::debug!("Abandoning request for {location}: load cancelled");
                return Err(FetchError::Cancelled(location.to_string()));
            }
        };

        self.decoder
            .decode(&data)
            .map_err(|e| FetchError::decode(location, e))
    }
}
