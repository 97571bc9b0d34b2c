//! Error types for cubemap_stream

use thiserror::Error;

/// Main error type for streaming operations
///
/// Tile fetch failures are not surfaced here during a run: they are logged and
/// reported through [`StreamEvents::on_tile_failed`](crate::StreamEvents::on_tile_failed).
/// This type covers caller misuse and setup problems, which fail fast.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("A load is already in progress for this cubemap")]
    LoadInProgress,

    #[error("No load has been started for this cubemap")]
    NoActiveLoad,

    #[error("Load task was dropped before it reported an outcome")]
    LoadAborted,
}

/// Result type alias for streaming operations
pub type Result<T> = std::result::Result<T, StreamError>;
