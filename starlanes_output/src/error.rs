// Error type for the output writer.
//
// Every failure is fatal to the batch: the writer aborts outstanding
// writes and returns the first error it sees. Nothing is retried.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    /// A filesystem operation failed.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact could not be serialized to JSON.
    #[error("failed to serialize {what}: {source}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    /// The cost map could not be encoded as PNG.
    #[error("failed to encode cost map image: {0}")]
    Image(#[from] image::ImageError),

    #[error("cost map buffer does not fit a {width}x{height} image")]
    ImageShape { width: u32, height: u32 },

    /// A write task panicked or was cancelled.
    #[error("write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("write limiter was closed")]
    LimiterClosed,
}

impl OutputError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(what: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            what: what.into(),
            source,
        }
    }
}
