//! TIFF file reader implementation
//!
//! Reads the header and IFD chain of a TIFF or BigTIFF file in either byte
//! order. Pixel data is decoded separately by the strip reader.

use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, SeekFrom};
use std::path::Path;

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::tiff::constants::{field_types, header};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{field_type_size, IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::tag_utils;

/// Reader for TIFF and BigTIFF files
pub struct TiffReader {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Current byte order
    byte_order: ByteOrder,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order_handler: None,
            byte_order: ByteOrder::LittleEndian,
            is_big_tiff: false,
        }
    }

    /// Returns the byte order handler once the header has been read
    pub fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Opens `filepath` and reads its structure
    pub fn load(&mut self, filepath: &Path) -> TiffResult<TIFF> {
        info!("Loading TIFF file: {}", filepath.display());

        let file = File::open(filepath)?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file);

        self.read(&mut reader)
    }

    /// Reads the header and every IFD of a TIFF file
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TIFF> {
        reader.seek(SeekFrom::Start(0))?;

        self.byte_order = ByteOrder::detect(reader)?;
        debug!("Detected byte order: {}", self.byte_order.name());
        let handler = self.byte_order.create_handler();

        let version = handler.read_u16(reader)?;
        self.is_big_tiff = match version {
            header::BIG_TIFF_VERSION => {
                validation::validate_bigtiff_header(reader, handler.as_ref())?;
                true
            },
            header::TIFF_VERSION => false,
            _ => return Err(TiffError::UnsupportedVersion(version)),
        };

        let first_ifd_offset = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };
        debug!("First IFD offset: {}", first_ifd_offset);

        self.byte_order_handler = Some(handler);

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        let mut tiff = TIFF::new(self.is_big_tiff, self.byte_order);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;

        debug!("Read {} IFDs", tiff.ifds.len());
        Ok(tiff)
    }

    /// Reads a chain of IFDs starting from the given offset
    ///
    /// A corrupt link ends the chain with a warning; pages read so far
    /// are kept. Offsets already visited end the chain as well.
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_ifd_offset: u64, file_size: u64) -> TiffResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut visited = HashSet::new();
        let mut ifd_offset = first_ifd_offset;

        while ifd_offset != 0 {
            if !visited.insert(ifd_offset) {
                warn!("IFD chain loops back to offset {}, stopping", ifd_offset);
                break;
            }
            if validation::validate_ifd_offset(ifd_offset, file_size).is_err() {
                warn!("IFD offset {} outside file of {} bytes, stopping", ifd_offset, file_size);
                break;
            }

            let (ifd, next_offset) = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(result) => result,
                Err(e) => {
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                }
            };

            ifds.push(ifd);
            ifd_offset = next_offset;
        }

        Ok(ifds)
    }

    /// Reads one IFD and the offset of the next one
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<(IFD, u64)> {
        let handler = self.handler()?;
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u16(reader)? as u64
        };

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            ifd.add_entry(self.read_ifd_entry(reader, handler)?);
        }

        let next_offset = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        debug!("Read IFD #{} with {} entries, next at {}", number, ifd.entry_count(), next_offset);
        Ok((ifd, next_offset))
    }

    /// Reads a single IFD entry, decoding inline single values
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader, handler: &dyn ByteOrderHandler) -> TiffResult<IFDEntry> {
        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let field_len = if self.is_big_tiff { 8 } else { 4 };
        let mut raw_value = [0u8; 8];
        reader.read_exact(&mut raw_value[..field_len])?;

        let payload = (field_type_size(field_type) as u64).checked_mul(count);
        let value_offset = if payload.is_some_and(|size| size <= field_len as u64) {
            match field_type {
                field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => raw_value[0] as u64,
                field_types::SHORT | field_types::SSHORT => handler.u16_from(&raw_value) as u64,
                field_types::LONG | field_types::SLONG => handler.u32_from(&raw_value) as u64,
                field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => handler.u64_from(&raw_value),
                _ => handler.u32_from(&raw_value) as u64,
            }
        } else if self.is_big_tiff {
            handler.u64_from(&raw_value)
        } else {
            handler.u32_from(&raw_value) as u64
        };

        Ok(IFDEntry::with_raw_value(tag, field_type, count, value_offset, raw_value))
    }

    /// Reads a tag's values as a vector of u64
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;

        debug!("Reading {} value(s) of tag {} ({})", entry.count, tag, tag_utils::get_tag_name(tag));
        tag_utils::read_tag_value_array(reader, entry, self.handler()?, self.is_big_tiff)
    }

    /// Reads an ASCII tag, dropping trailing NUL bytes
    pub fn read_ascii(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<String> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;

        let mut buffer = tag_utils::read_tag_bytes(reader, entry, self.is_big_tiff)?;
        while buffer.last() == Some(&0) {
            buffer.pop();
        }

        String::from_utf8(buffer)
            .map_err(|e| TiffError::GenericError(format!("Invalid UTF-8 string: {}", e)))
    }
}
