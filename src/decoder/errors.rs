//! Errors raised by decoder backends

use std::io;
use thiserror::Error;

use crate::metadata::MetadataError;
use crate::tiff::errors::TiffError;

/// Failure inside a decoder backend
#[derive(Debug, Error)]
pub enum DecodeError {
    /// I/O error while touching the container
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The container's TIFF structure could not be read
    #[error("{0}")]
    Tiff(#[from] TiffError),

    /// The embedded metadata document is malformed
    #[error("{0}")]
    Metadata(#[from] MetadataError),

    /// The container carries no metadata document
    #[error("no metadata document: {0}")]
    MissingMetadata(String),

    /// The container is valid but uses features this backend cannot decode
    #[error("unsupported container: {0}")]
    UnsupportedContainer(String),

    /// A plane coordinate outside the container's axes
    #[error("plane (c={c}, z={z}, t={t}) is outside the container")]
    PlaneOutOfRange { c: usize, z: usize, t: usize },

    /// A plane larger than the session's heap limit
    #[error("plane needs {required} bytes, over the decoder limit of {limit} bytes")]
    MemoryLimit { required: u64, limit: u64 },

    /// Invalid session configuration
    #[error("invalid decoder configuration: {0}")]
    Config(String),
}

/// Result type for decoder operations
pub type DecodeResult<T> = Result<T, DecodeError>;
