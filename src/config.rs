//! Streaming configuration

use std::time::Duration;

use crate::error::{Result, StreamError};
use crate::spatial::admission_threshold;

/// Default number of tiles admitted per batch
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default peripheral field of view in degrees
pub const DEFAULT_PERIPHERAL_FOV: f32 = 120.0;

/// Default tile file extension
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Default pause between idle scheduling passes and between cancellation polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default cube edge length
pub const DEFAULT_PANORAMA_SIZE: f32 = 100.0;

/// Knobs shared by every loading strategy
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Maximum number of fetches in flight at once
    pub concurrency: usize,
    /// Full angle of the admission cone used by the visible-batch strategy
    pub peripheral_fov_degrees: f32,
    /// Extension appended to fetch locations, without the dot
    pub extension: String,
    /// Pause after a visible-batch pass that admitted nothing, and how often
    /// [`HttpFetcher`](crate::loader::HttpFetcher) checks the cancellation scope
    pub poll_interval: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            peripheral_fov_degrees: DEFAULT_PERIPHERAL_FOV,
            extension: DEFAULT_EXTENSION.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl StreamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_peripheral_fov(mut self, degrees: f32) -> Self {
        self.peripheral_fov_degrees = degrees;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Score a tile must exceed to be admitted by the visible-batch strategy
    pub fn admission_threshold(&self) -> f32 {
        admission_threshold(self.peripheral_fov_degrees)
    }

    /// Reject settings no strategy can run with
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(StreamError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if !(self.peripheral_fov_degrees > 0.0 && self.peripheral_fov_degrees <= 360.0) {
            return Err(StreamError::InvalidConfig(format!(
                "peripheral field of view must be in (0, 360] degrees, got {}",
                self.peripheral_fov_degrees
            )));
        }
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(StreamError::InvalidConfig(format!(
                "extension must be non-empty and given without a leading dot, got {:?}",
                self.extension
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(StreamError::InvalidConfig(
                "poll interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for a two-layer panorama session
#[derive(Debug, Clone, PartialEq)]
pub struct PanoramaConfig {
    /// Remote directory the environment lives in, including any trailing separator
    pub remote_dir: String,
    /// Environment name appended to `remote_dir`
    pub env_name: String,
    /// Edge length of the high-resolution cube
    pub size: f32,
    pub stream: StreamConfig,
}

impl PanoramaConfig {
    pub fn new(remote_dir: impl Into<String>, env_name: impl Into<String>) -> Self {
        Self {
            remote_dir: remote_dir.into(),
            env_name: env_name.into(),
            size: DEFAULT_PANORAMA_SIZE,
            stream: StreamConfig::default(),
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_stream(mut self, stream: StreamConfig) -> Self {
        self.stream = stream;
        self
    }

    /// Base path every tile location is built from
    pub fn base_path(&self) -> String {
        format!("{}{}", self.remote_dir, self.env_name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.env_name.is_empty() {
            return Err(StreamError::InvalidConfig(
                "environment name must not be empty".to_string(),
            ));
        }
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(StreamError::InvalidConfig(format!(
                "panorama size must be positive, got {}",
                self.size
            )));
        }
        self.stream.validate()
    }
}
