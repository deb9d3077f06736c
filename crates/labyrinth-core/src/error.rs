//! Error type for fallible engine operations.

use thiserror::Error;

/// Errors that can occur while configuring, generating or persisting a maze.
#[derive(Debug, Error)]
pub enum MazeError {
    /// A structural template (floor, wall, ceiling) is not configured.
    #[error("missing structural template: {0}")]
    MissingTemplate(&'static str),

    #[error("invalid maze dimensions {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("wall probability {0} is outside 0..=100")]
    InvalidWallProbability(u8),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("snapshot version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}
