//! Filesystem fetch client
//!
//! Treats a tile location as a path. Useful for panoramas shipped next to the
//! application or mirrored to local disk.

use std::path::PathBuf;

use super::{FetchClient, FetchError};
use crate::cancel::CancellationScope;
use crate::texture::{TextureDecoder, TileTexture};

/// Reads tile images from disk and decodes them
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    root: Option<PathBuf>,
    decoder: TextureDecoder,
}

impl FileFetcher {
    /// Create a fetcher that uses locations as paths verbatim
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher that resolves locations relative to `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            decoder: TextureDecoder::new(),
        }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(location),
            None => PathBuf::from(location),
        }
    }
}

#[async_trait::async_trait]
impl FetchClient for FileFetcher {
    type Texture = TileTexture;

    async fn fetch(
        &self,
        location: &str,
        scope: &CancellationScope,
    ) -> Result<TileTexture, FetchError> {
        if scope.is_cancelled() {
            return Err(FetchError::Cancelled(location.to_string()));
        }

        let data = std::fs::read(self.resolve(location)).map_err(|e| FetchError::Io {
            location: location.to_string(),
            message: e.to_string(),
        })?;
        if scope.is_cancelled() {
            return Err(FetchError::Cancelled(location.to_string()));
        }

        self.decoder
            .decode(&data)
            .map_err(|e| FetchError::decode(location, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::tests::encoded_tile;
    use futures::executor::block_on;
    use image::ImageFormat;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "cubemap_stream_{name}_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_fetch_existing_tile() {
        let dir = scratch_dir("file_ok");
        std::fs::write(dir.join("lobby_0_512_0_0.png"), encoded_tile(ImageFormat::Png)).unwrap();

        let fetcher = FileFetcher::with_root(&dir);
        let texture = block_on(fetcher.fetch("lobby_0_512_0_0.png", &CancellationScope::new()))
            .unwrap();
        assert_eq!(texture.width, 2);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_tile_is_io_error() {
        let dir = scratch_dir("file_missing");
        let fetcher = FileFetcher::with_root(&dir);
        let result = block_on(fetcher.fetch("nope_0_512_0_0.jpg", &CancellationScope::new()));
        assert!(matches!(result, Err(FetchError::Io { .. })));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_undecodable_tile_is_decode_error() {
        let dir = scratch_dir("file_garbage");
        std::fs::write(dir.join("bad.jpg"), b"not a jpeg").unwrap();

        let fetcher = FileFetcher::with_root(&dir);
        let result = block_on(fetcher.fetch("bad.jpg", &CancellationScope::new()));
        assert!(matches!(result, Err(FetchError::Decode { .. })));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_cancelled_scope_skips_read() {
        let scope = CancellationScope::new();
        scope.cancel();
        let result = block_on(FileFetcher::new().fetch("/does/not/matter.jpg", &scope));
        assert!(matches!(result, Err(FetchError::Cancelled(_))));
    }
}
