//! Byte order handling for TIFF files
//!
//! Strategy objects for little-endian ("II") and big-endian ("MM") files.
//! Besides reading header fields they decode inline tag values from raw
//! entry bytes and normalise pixel samples to little-endian, which is the
//! only layout the rest of the crate works with.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use byteorder::ByteOrder as Endian;
use std::io::Result;

use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};

/// Represents the byte order of a TIFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from the first two bytes of a TIFF header
    pub fn detect(reader: &mut dyn SeekableReader) -> TiffResult<Self> {
        let marker = reader.read_u16::<LittleEndian>()?;
        match marker {
            0x4949 => Ok(ByteOrder::LittleEndian),
            0x4D4D => Ok(ByteOrder::BigEndian),
            _ => Err(TiffError::InvalidByteOrder(marker)),
        }
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Trait for byte order handling strategies
pub trait ByteOrderHandler: Send + Sync {
    /// Read a u16 value
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;

    /// Read a u32 value
    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;

    /// Read a u64 value
    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;

    /// Decode a u16 from the start of `bytes`
    fn u16_from(&self, bytes: &[u8]) -> u16;

    /// Decode a u32 from the start of `bytes`
    fn u32_from(&self, bytes: &[u8]) -> u32;

    /// Decode a u64 from the start of `bytes`
    fn u64_from(&self, bytes: &[u8]) -> u64;

    /// Rewrite samples of `bytes_per_sample` width in place as little-endian
    fn normalize_samples(&self, data: &mut [u8], bytes_per_sample: usize);
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<LittleEndian>()
    }

    fn u16_from(&self, bytes: &[u8]) -> u16 {
        LittleEndian::read_u16(bytes)
    }

    fn u32_from(&self, bytes: &[u8]) -> u32 {
        LittleEndian::read_u32(bytes)
    }

    fn u64_from(&self, bytes: &[u8]) -> u64 {
        LittleEndian::read_u64(bytes)
    }

    fn normalize_samples(&self, _data: &mut [u8], _bytes_per_sample: usize) {
        // Already in the target layout
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<BigEndian>()
    }

    fn u16_from(&self, bytes: &[u8]) -> u16 {
        BigEndian::read_u16(bytes)
    }

    fn u32_from(&self, bytes: &[u8]) -> u32 {
        BigEndian::read_u32(bytes)
    }

    fn u64_from(&self, bytes: &[u8]) -> u64 {
        BigEndian::read_u64(bytes)
    }

    fn normalize_samples(&self, data: &mut [u8], bytes_per_sample: usize) {
        if bytes_per_sample < 2 {
            return;
        }
        for sample in data.chunks_exact_mut(bytes_per_sample) {
            sample.reverse();
        }
    }
}
