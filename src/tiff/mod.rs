//! TIFF reading and writing
//!
//! Reads TIFF and BigTIFF containers in either byte order and writes
//! little-endian grayscale multi-page stacks.

pub mod errors;
pub mod ifd;
pub(crate) mod types;
pub mod reader;
pub mod strip_reader;
#[cfg(test)]
mod tests;
pub mod builder;
mod builders;
pub(crate) mod constants;
pub(crate) mod validation;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use strip_reader::{PageData, StripReader};
pub use types::TIFF;
pub use builder::TiffBuilder;
pub use constants::{sample_format, tags};
