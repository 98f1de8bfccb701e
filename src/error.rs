//! Error types for the gallery
//!
//! Every failure is fatal for the render pass that raised it; nothing is
//! retried and nothing is swallowed.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, GalleryError>;

/// Main error type for the gallery
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Entities should be sorted in ascending order: entity {index} starts at {current}, previous starts at {previous}")]
    UnsortedEntities {
        index: usize,
        previous: usize,
        current: usize,
    },

    #[error("Invalid entity span {start}..{end} for text of {len} characters")]
    InvalidSpan { start: usize, end: usize, len: usize },

    #[error("Cannot assign {requested} distinct colors from a palette of {available}")]
    PaletteExhausted { requested: usize, available: usize },

    #[error("Unknown file: {0}")]
    UnknownTarget(String),

    #[error("Example '{0}' not found")]
    ExampleNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GalleryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GalleryError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        GalleryError::Json {
            path: path.into(),
            source,
        }
    }

    /// True for caller contract violations on highlighter input
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            GalleryError::UnsortedEntities { .. } | GalleryError::InvalidSpan { .. }
        )
    }
}
