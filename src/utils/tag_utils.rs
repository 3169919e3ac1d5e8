//! TIFF tag utilities
//!
//! Display names for tags (loaded once from the embedded `tiff_tags.toml`)
//! and helpers for decoding multi-valued tag payloads.

use std::collections::HashMap;
use std::io::SeekFrom;
use lazy_static::lazy_static;

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{field_type_size, IFDEntry};
use crate::tiff::constants::field_types;
use crate::tiff::validation;

lazy_static! {
    static ref TAG_DEFINITIONS: TagDefinitions = {
        let content = include_str!("../../tiff_tags.toml");
        TagDefinitions::from_str(content).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to parse TIFF tag definitions: {}", e);
            TagDefinitions::default()
        })
    };
}

/// Lookup tables for human-readable TIFF codes
#[derive(Debug, Default)]
pub struct TagDefinitions {
    pub tag_names: HashMap<u16, String>,
    pub field_type_names: HashMap<u16, String>,
    pub compression_names: HashMap<u16, String>,
}

impl TagDefinitions {
    /// Parse definitions from a TOML string
    pub fn from_str(content: &str) -> TiffResult<Self> {
        let value: toml::Value = content.parse()
            .map_err(|e| TiffError::GenericError(format!("Failed to parse TOML: {}", e)))?;

        Ok(TagDefinitions {
            tag_names: Self::table(&value, "tag_ids"),
            field_type_names: Self::table(&value, "field_types"),
            compression_names: Self::table(&value, "compression"),
        })
    }

    fn table(value: &toml::Value, name: &str) -> HashMap<u16, String> {
        let mut map = HashMap::new();
        if let Some(table) = value.get(name).and_then(|v| v.as_table()) {
            for (k, v) in table {
                if let (Ok(id), Some(label)) = (k.parse::<u16>(), v.as_str()) {
                    map.insert(id, label.to_string());
                }
            }
        }
        map
    }
}

fn lookup(map: &'static HashMap<u16, String>, code: u16) -> &'static str {
    map.get(&code).map(|s| s.as_str()).unwrap_or("Unknown")
}

/// Get the name of a TIFF tag, or "Unknown"
pub fn get_tag_name(tag: u16) -> &'static str {
    lookup(&TAG_DEFINITIONS.tag_names, tag)
}

/// Get the name of a TIFF field type, or "Unknown"
pub fn get_field_type_name(field_type: u16) -> &'static str {
    lookup(&TAG_DEFINITIONS.field_type_names, field_type)
}

/// Get the name of a compression method, or "Unknown"
pub fn get_compression_name(compression_code: u64) -> &'static str {
    u16::try_from(compression_code)
        .map(|code| lookup(&TAG_DEFINITIONS.compression_names, code))
        .unwrap_or("Unknown")
}

/// Reads every value of a numeric tag as u64
///
/// Inline payloads are decoded from the entry's raw bytes, anything
/// larger is read from the entry's offset.
pub fn read_tag_value_array(
    reader: &mut dyn SeekableReader,
    entry: &IFDEntry,
    handler: &dyn ByteOrderHandler,
    is_big_tiff: bool,
) -> TiffResult<Vec<u64>> {
    let width = field_type_size(entry.field_type);
    let bytes = read_tag_bytes(reader, entry, is_big_tiff)?;

    bytes.chunks_exact(width)
        .map(|chunk| match entry.field_type {
            field_types::BYTE | field_types::UNDEFINED => Ok(chunk[0] as u64),
            field_types::SHORT => Ok(handler.u16_from(chunk) as u64),
            field_types::LONG => Ok(handler.u32_from(chunk) as u64),
            field_types::LONG8 | field_types::IFD8 => Ok(handler.u64_from(chunk)),
            other => Err(TiffError::UnsupportedFieldType(other)),
        })
        .collect()
}

/// Reads the undecoded payload bytes of a tag
pub fn read_tag_bytes(
    reader: &mut dyn SeekableReader,
    entry: &IFDEntry,
    is_big_tiff: bool,
) -> TiffResult<Vec<u8>> {
    let size = entry.payload_size()
        .ok_or_else(|| TiffError::GenericError(format!(
            "Tag {} declares {} values, payload size overflows", entry.tag, entry.count)))?;
    if entry.is_value_inline(is_big_tiff) {
        return Ok(entry.raw_value[..size as usize].to_vec());
    }

    let file_size = validation::get_file_size(reader)?;
    validation::validate_data_range(entry.value_offset, size, file_size)?;
    let len = usize::try_from(size)
        .map_err(|_| TiffError::GenericError(format!("Tag {} payload of {} bytes", entry.tag, size)))?;
    let mut buffer = vec![0u8; len];
    reader.seek(SeekFrom::Start(entry.value_offset))?;
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}
