//! Two-layer panorama streaming
//!
//! A coarse 1×1 cubemap loads in full so the whole environment shows up
//! quickly, while a 4×4 cubemap just inside it streams the tiles the viewer is
//! looking at.

use std::sync::Arc;

use crate::async_loading::TiledCubemap;
use crate::config::PanoramaConfig;
use crate::error::Result;
use crate::events::StreamEvents;
use crate::loader::FetchClient;
use crate::runtime::AsyncSpawner;
use crate::scheduler::{LoadOutcome, StreamScheduler, Strategy};
use crate::spatial::ViewpointSource;
use crate::tile::Division;

/// Name of the coarse layer
pub const LOW_RES_NAME: &str = "Cubemap2K";

/// Name of the detailed layer
pub const HIGH_RES_NAME: &str = "Cubemap8K";

/// Gap between the two layers so the coarse cube sits just outside the detailed one
const LAYER_OFFSET: f32 = 0.01;

/// Coarse and detailed cubemaps streamed from the same environment
#[derive(Debug)]
pub struct PanoramaSession {
    config: PanoramaConfig,
    low_res: TiledCubemap,
    high_res: TiledCubemap,
}

impl PanoramaSession {
    pub fn new(config: PanoramaConfig) -> Result<Self> {
        config.validate()?;
        let low_res = TiledCubemap::new(
            LOW_RES_NAME,
            Division::Matrix1x1,
            config.size + LAYER_OFFSET,
        );
        let high_res = TiledCubemap::new(HIGH_RES_NAME, Division::Matrix4x4, config.size);

        Ok(Self {
            config,
            low_res,
            high_res,
        })
    }

    pub fn config(&self) -> &PanoramaConfig {
        &self.config
    }

    pub fn low_res(&self) -> &TiledCubemap {
        &self.low_res
    }

    pub fn high_res(&self) -> &TiledCubemap {
        &self.high_res
    }

    /// Start both layers: the coarse one loads everything, the detailed one
    /// loads visible batches around `viewpoint`
    pub fn start<F, E, S>(
        &mut self,
        fetcher: F,
        viewpoint: Arc<dyn ViewpointSource>,
        events: Arc<E>,
        spawner: &S,
    ) -> Result<()>
    where
        F: FetchClient + 'static,
        E: StreamEvents<F::Texture> + ?Sized + 'static,
        S: AsyncSpawner,
    {
        let scheduler = Arc::new(StreamScheduler::new(fetcher, self.config.stream.clone())?);
        let base = self.config.base_path();
        log::info!("Streaming panorama from {base}");

        self.low_res.start_loading(
            Strategy::All,
            base.clone(),
            Arc::clone(&scheduler),
            Arc::clone(&events),
            spawner,
        )?;
        let detail = self.high_res.start_loading(
            Strategy::VisibleBatchFirst(viewpoint),
            base,
            scheduler,
            events,
            spawner,
        );
        if let Err(err) = detail {
            log::warn!("Detailed layer did not start ({err}); stopping coarse layer");
            self.low_res.stop_loading();
            return Err(err);
        }
        Ok(())
    }

    /// Cancel both layers
    pub fn stop(&self) {
        self.low_res.stop_loading();
        self.high_res.stop_loading();
    }

    /// Wait for both layers; returns (coarse, detailed) outcomes
    ///
    /// Both layers are always collected, so neither is left loading when the
    /// other fails. The coarse layer's error wins if both fail.
    pub async fn finish(&mut self) -> Result<(LoadOutcome, LoadOutcome)> {
        let low = self.low_res.finish().await;
        let high = self.high_res.finish().await;
        Ok((low?, high?))
    }
}
