use crate::session::BufferId;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] pyedit_config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Position error: {0}")]
    Position(#[from] PositionError),

    #[error("Failed to read {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown buffer: {0}")]
    UnknownBuffer(BufferId),

    #[error("Buffer is read-only: {}", .0.display())]
    ReadOnly(PathBuf),

    #[error("Offset {offset} is not a valid edit position (buffer length {len})")]
    InvalidOffset { offset: usize, len: usize },
}

/// Failure converting between buffer offsets and line/column positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("line {line} is out of range (buffer has {line_count} lines)")]
    LineOutOfRange { line: usize, line_count: usize },

    #[error("column {column} is out of range on line {line} (line length {line_len})")]
    ColumnOutOfRange {
        line: usize,
        column: usize,
        line_len: usize,
    },
}

/// Failure applying a navigation intent, surfaced to the user by the host
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Cannot open {}: the file no longer exists", .0.display())]
    TargetMissing(PathBuf),

    #[error("No buffer is active")]
    NoActiveBuffer,

    #[error("Host failed to open {}: {message}", path.display())]
    Host { path: PathBuf, message: String },
}
