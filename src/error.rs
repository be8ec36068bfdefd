//! Error types for the exporter.

use std::path::PathBuf;

/// Result type used throughout the exporter.
pub type Result<T, E = ExportError> = std::result::Result<T, E>;

/// Everything that can go wrong while reading a corpus or writing a table.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Reading or writing a file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to an in-memory or already-open sink failed.
    #[error(transparent)]
    Write(#[from] std::io::Error),

    /// The primary dataset is not well-formed CSV.
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),

    /// The root corpus is not valid JSON.
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    /// The root corpus parsed, but the top level is not an object.
    #[error("root corpus must be a JSON object, found {0}")]
    RootShape(&'static str),

    /// The configuration file is not valid YAML.
    #[error("malformed config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The primary dataset produced no usable entries.
    #[error("no valid entries in {}", .0.display())]
    EmptySource(PathBuf),
}

impl ExportError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
