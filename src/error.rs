use std::path::PathBuf;

use thiserror::Error;

/// Library error type for filter-workflow operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An uploaded image could not be decoded into pixels.
    #[error("failed to decode image {name}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    /// A selected file could not be read into memory.
    #[error("failed to read {name}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the exported PNG failed.
    #[error("failed to export canvas to {}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// No usable font face could be loaded.
    #[error("font error: {0}")]
    Font(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
