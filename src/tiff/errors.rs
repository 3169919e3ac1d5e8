//! Custom error types for TIFF processing

use std::io;
use thiserror::Error;

/// TIFF-specific error types
#[derive(Debug, Error)]
pub enum TiffError {
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    /// Invalid TIFF header
    #[error("Invalid TIFF header")]
    InvalidHeader,
    /// Invalid byte order marker
    #[error("Invalid byte order marker: {0:#06x}")]
    InvalidByteOrder(u16),
    /// Invalid BigTIFF header
    #[error("Invalid BigTIFF header")]
    InvalidBigTIFFHeader,
    /// Unsupported TIFF version
    #[error("Unsupported TIFF version: {0}")]
    UnsupportedVersion(u16),
    /// Tag not found
    #[error("Tag not found: {0}")]
    TagNotFound(u16),
    /// Unsupported field type
    #[error("Unsupported field type: {0}")]
    UnsupportedFieldType(u16),
    /// Unsupported compression method
    #[error("Unsupported compression method: {0}")]
    UnsupportedCompression(u64),
    /// Image dimensions not found
    #[error("Image dimensions not found")]
    MissingDimensions,
    /// Page layout the reader cannot decode (tiles, predictors, multi-sample pixels)
    #[error("Unsupported page layout: {0}")]
    UnsupportedLayout(String),
    /// Classic TIFF cannot address the data being written
    #[error("File needs {required} bytes, beyond the 4 GiB limit of classic TIFF; use big format")]
    ClassicTiffOverflow { required: u64 },
    /// Generic error with message
    #[error("TIFF error: {0}")]
    GenericError(String),
}

/// Result type for TIFF operations
pub type TiffResult<T> = Result<T, TiffError>;

impl From<String> for TiffError {
    fn from(msg: String) -> Self {
        TiffError::GenericError(msg)
    }
}
