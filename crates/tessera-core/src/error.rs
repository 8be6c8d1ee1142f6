use thiserror::Error;

/// Errors raised while building or validating a chunk view configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "view distance must be between 1 and {max} chunks, got {0}",
        max = crate::constants::MAX_VIEW_DISTANCE
    )]
    InvalidViewDistance(i32),

    #[error("chunk size must be between 1 and {max} voxels, got {actual}")]
    InvalidChunkSize { actual: i32, max: i32 },

    #[error("Failed to parse view config RON: {0}")]
    Parse(String),
}
