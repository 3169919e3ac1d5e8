//! Container decoding boundary
//!
//! The conversion pipeline never parses an instrument format itself. It
//! talks to a `ContainerDecoder` backend through a `DecoderSession`, opens
//! one `Container` per input file and pulls planes from it by
//! (channel, depth, time) coordinate.

pub mod errors;
pub mod plane;
pub mod session;
pub mod ome_tiff;

use std::path::Path;

use crate::metadata::MetadataDocument;

pub use errors::{DecodeError, DecodeResult};
pub use plane::{PixelType, Plane};
pub use session::{parse_memory_size, DecoderSession, SessionConfig};
pub use ome_tiff::OmeTiffDecoder;

/// Extent of a container along its channel, depth and time axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSizes {
    pub c: usize,
    pub z: usize,
    pub t: usize,
}

impl AxisSizes {
    pub fn new(c: usize, z: usize, t: usize) -> Self {
        AxisSizes { c, z, t }
    }

    /// True when at most one of depth and time is a free axis
    pub fn is_four_dimensional(&self) -> bool {
        self.z == 1 || self.t == 1
    }

    /// Number of planes each channel contributes, `None` on overflow
    pub fn planes_per_channel(&self) -> Option<usize> {
        self.z.checked_mul(self.t)
    }

    /// Number of planes in the whole container, `None` on overflow
    pub fn total_planes(&self) -> Option<usize> {
        self.planes_per_channel()?.checked_mul(self.c)
    }
}

/// An open input file
///
/// Dropping the container releases the underlying file.
pub trait Container {
    /// Channel, depth and time extents
    fn axis_sizes(&self) -> AxisSizes;

    /// Read the plane at (c, z, t) with its stored sample values
    fn read_plane(&mut self, c: usize, z: usize, t: usize) -> DecodeResult<Plane>;
}

/// A backend able to decode one family of container formats
pub trait ContainerDecoder {
    /// Display name used in logs
    fn name(&self) -> &str;

    /// Whether this backend recognises `path` as one of its containers
    fn can_open(&self, path: &Path) -> bool;

    /// Open a container for plane reads
    fn open(&self, path: &Path, config: &SessionConfig) -> DecodeResult<Box<dyn Container>>;

    /// Extract the acquisition metadata document of a container
    fn metadata(&self, path: &Path) -> DecodeResult<MetadataDocument>;

    /// Called once when the session starts
    fn start(&mut self, _config: &SessionConfig) -> DecodeResult<()> {
        Ok(())
    }

    /// Called once when the session stops
    fn shutdown(&mut self) {}
}
