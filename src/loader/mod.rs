//! Tile fetch clients
//!
//! A [`FetchClient`] turns one tile location into a texture resource. The
//! scheduler only sees the trait; concrete clients read local files, talk HTTP
//! (feature `http`), or replay scripted results in tests.

pub mod file;
#[cfg(feature = "http")]
pub mod http;
pub mod mock;

use std::sync::Arc;

use thiserror::Error;

use crate::cancel::CancellationScope;
use crate::texture::TextureError;
use crate::tile::TileId;

// Re-export implementations
pub use file::FileFetcher;
#[cfg(feature = "http")]
pub use http::HttpFetcher;
pub use mock::{MockFetcher, MockTexture};

/// Why a single tile fetch did not produce a texture
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Network error fetching {location}: {message}")]
    Network { location: String, message: String },

    #[error("Request for {location} returned status {status}")]
    Status { location: String, status: u16 },

    #[error("Failed to read {location}: {message}")]
    Io { location: String, message: String },

    #[error("Failed to decode {location}: {message}")]
    Decode { location: String, message: String },

    #[error("Fetch of {0} was cancelled")]
    Cancelled(String),
}

impl FetchError {
    pub fn network(location: &str, message: impl ToString) -> Self {
        Self::Network {
            location: location.to_string(),
            message: message.to_string(),
        }
    }

    pub fn decode(location: &str, err: TextureError) -> Self {
        Self::Decode {
            location: location.to_string(),
            message: err.to_string(),
        }
    }

    /// Whether the fetch gave up because its scope was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Trait for fetching one tile's texture
///
/// The run's cancellation scope is handed to every fetch. The scheduler always
/// awaits a fetch it dispatched, so stopping a run early is up to the client:
/// check `scope` before starting work, and if a fetch can stay outstanding for
/// a while, poll it every [`StreamConfig::poll_interval`] and return
/// [`FetchError::Cancelled`] once it fires. `HttpFetcher` races the request
/// against that poll; [`FileFetcher`] checks before reading and before decoding.
/// A cancelled fetch is not reported as a tile failure.
///
/// [`StreamConfig::poll_interval`]: crate::StreamConfig::poll_interval
#[async_trait::async_trait]
pub trait FetchClient: Send + Sync {
    /// Resource handed to the rendering collaborator on success
    type Texture: Send + 'static;

    /// Fetch the texture stored at `location`
    async fn fetch(
        &self,
        location: &str,
        scope: &CancellationScope,
    ) -> Result<Self::Texture, FetchError>;
}

#[async_trait::async_trait]
impl<F: FetchClient + ?Sized> FetchClient for Arc<F> {
    type Texture = F::Texture;

    async fn fetch(
        &self,
        location: &str,
        scope: &CancellationScope,
    ) -> Result<Self::Texture, FetchError> {
        (**self).fetch(location, scope).await
    }
}

/// Build the fetch location of a tile: `{base}_{tile}.{extension}`
pub fn tile_location(base: &str, tile: &TileId, extension: &str) -> String {
    format!("{base}_{tile}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{CubeFace, Division, Tile};

    #[test]
    fn test_tile_location() {
        let tile = Tile::place(CubeFace::Back, Division::Matrix1x1, 0, 0, 1.0);
        assert_eq!(
            tile_location("https://cdn/envs/lobby", tile.id(), "jpg"),
            "https://cdn/envs/lobby_2_512_0_0.jpg"
        );
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            location: "a_0_512_0_0.jpg".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Request for a_0_512_0_0.jpg returned status 404"
        );
        assert!(!err.is_cancelled());
        assert!(FetchError::Cancelled("x".to_string()).is_cancelled());
    }
}
