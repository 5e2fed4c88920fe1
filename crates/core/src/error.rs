//! Error types for the recommender platform

use std::path::PathBuf;
use thiserror::Error;

/// Error types for recommender operations
#[derive(Debug, Error)]
pub enum RecommenderError {
    /// A backing dataset file is missing, unreadable, or structurally broken.
    ///
    /// The engine cannot answer any query without its data, so this is fatal
    /// at initialization.
    #[error("dataset error for {path}: {message}")]
    Dataset { path: PathBuf, message: String },

    /// Configuration loading or validation failed
    #[error("configuration error: {message}")]
    Configuration {
        message: String,
        key: Option<String>,
    },

    /// Neighbor cache could not be loaded or persisted
    #[error("neighbor cache error for {path}: {message}")]
    Cache { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecommenderError {
    /// Build a dataset error for the given file
    pub fn dataset(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Dataset {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Build a cache error for the given file
    pub fn cache(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Cache {
            path: path.into(),
            message: message.into(),
        }
    }
}
