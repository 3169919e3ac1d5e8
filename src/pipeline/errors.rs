//! Errors of the conversion pipeline
//!
//! Every per-file error names the input file and the stage that failed.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::decoder::DecodeError;
use crate::tiff::errors::TiffError;

/// A file the stack writer could not produce
#[derive(Debug, Error)]
#[error("cannot write {}: {source}", .target.display())]
pub struct OutputError {
    pub target: PathBuf,
    #[source]
    pub source: TiffError,
}

impl OutputError {
    pub fn new(target: impl Into<PathBuf>, source: impl Into<TiffError>) -> Self {
        OutputError {
            target: target.into(),
            source: source.into(),
        }
    }
}

/// Conversion failure
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{}: metadata stage failed: {source}", .path.display())]
    MetadataUnavailable {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("{}: open stage failed: {source}", .path.display())]
    ContainerUnavailable {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("{}: unsupported dimensionality (Z={z}, T={t}); only containers with Z=1 or T=1 can be converted", .path.display())]
    UnsupportedDimensionality { path: PathBuf, z: usize, t: usize },

    #[error("{}: plane read stage failed at c={c}, z={z}, t={t}: {source}", .path.display())]
    PlaneReadFailure {
        path: PathBuf,
        c: usize,
        z: usize,
        t: usize,
        #[source]
        source: DecodeError,
    },

    #[error("{}: write stage failed: {source}", .path.display())]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: OutputError,
    },

    #[error("cannot read {}: {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{failed} of {attempted} files failed to convert")]
    BatchIncomplete { failed: usize, attempted: usize },
}

impl ConvertError {
    /// Input file the error concerns, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConvertError::MetadataUnavailable { path, .. }
            | ConvertError::ContainerUnavailable { path, .. }
            | ConvertError::UnsupportedDimensionality { path, .. }
            | ConvertError::PlaneReadFailure { path, .. }
            | ConvertError::OutputWriteFailure { path, .. }
            | ConvertError::Discovery { path, .. } => Some(path),
            ConvertError::Config(_) | ConvertError::BatchIncomplete { .. } => None,
        }
    }

    /// Short name of the failing stage
    pub fn stage(&self) -> &'static str {
        match self {
            ConvertError::MetadataUnavailable { .. } => "metadata",
            ConvertError::ContainerUnavailable { .. } => "open",
            ConvertError::UnsupportedDimensionality { .. } => "dimensionality",
            ConvertError::PlaneReadFailure { .. } => "plane read",
            ConvertError::OutputWriteFailure { .. } => "write",
            ConvertError::Discovery { .. } => "discovery",
            ConvertError::Config(_) => "config",
            ConvertError::BatchIncomplete { .. } => "batch",
        }
    }
}

/// Result type for conversion operations
pub type ConvertResult<T> = Result<T, ConvertError>;
