use std::io::Cursor;
use std::path::PathBuf;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::compression::CompressionHandler;

/// Little-endian classic TIFF with one 4x2 8-bit page stored in two strips
pub fn create_two_strip_tiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(16).unwrap();     // IFD offset

    // Strip data at offset 8: rows [1,2,3,4] and [5,6,7,8]
    buffer.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

    // IFD at offset 16 with 6 entries
    buffer.write_u16::<LittleEndian>(6).unwrap();
    write_entry_le(&mut buffer, 256, 3, 1, 4);          // ImageWidth (SHORT, inline)
    write_entry_le(&mut buffer, 257, 3, 1, 2);          // ImageLength
    write_entry_le(&mut buffer, 258, 3, 1, 8);          // BitsPerSample
    write_entry_le(&mut buffer, 273, 3, 2, 8 | (12 << 16)); // StripOffsets [8, 12] inline
    write_entry_le(&mut buffer, 278, 3, 1, 1);          // RowsPerStrip
    write_entry_le(&mut buffer, 279, 3, 2, 4 | (4 << 16));  // StripByteCounts [4, 4]
    buffer.write_u32::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

/// Big-endian classic TIFF with one 2x1 16-bit page
pub fn create_big_endian_tiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    buffer.write_u16::<BigEndian>(0x4D4D).unwrap(); // MM
    buffer.write_u16::<BigEndian>(42).unwrap();
    buffer.write_u32::<BigEndian>(12).unwrap();

    // Pixels 0x0102 and 0x0304, big-endian
    buffer.extend_from_slice(&[0x01, 0x02, 0x03, 0x04]);

    buffer.write_u16::<BigEndian>(5).unwrap();
    write_short_entry_be(&mut buffer, 256, 2);
    write_short_entry_be(&mut buffer, 257, 1);
    write_short_entry_be(&mut buffer, 258, 16);
    write_long_entry_be(&mut buffer, 273, 8);
    write_long_entry_be(&mut buffer, 279, 4);
    buffer.write_u32::<BigEndian>(0).unwrap();

    Cursor::new(buffer)
}

/// Little-endian classic TIFF with one single-row 8-bit page whose strip
/// is compressed by `handler`
pub fn create_compressed_tiff_buffer(handler: &dyn CompressionHandler, pixels: &[u8]) -> Cursor<Vec<u8>> {
    let strip = handler.compress(pixels).unwrap();
    let ifd_offset = (8 + strip.len() + 1) & !1;

    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(ifd_offset as u32).unwrap();
    buffer.extend_from_slice(&strip);
    buffer.resize(ifd_offset, 0);

    buffer.write_u16::<LittleEndian>(6).unwrap();
    write_entry_le(&mut buffer, 256, 4, 1, pixels.len() as u32);
    write_entry_le(&mut buffer, 257, 3, 1, 1);
    write_entry_le(&mut buffer, 258, 3, 1, 8);
    write_entry_le(&mut buffer, 259, 3, 1, handler.code() as u32);
    write_entry_le(&mut buffer, 273, 4, 1, 8);
    write_entry_le(&mut buffer, 279, 4, 1, strip.len() as u32);
    buffer.write_u32::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

/// Little-endian BigTIFF whose only entry is an ImageDescription with an
/// arbitrary declared type and count
pub fn create_bigtiff_description_buffer(field_type: u16, count: u64) -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(43).unwrap();
    buffer.write_u16::<LittleEndian>(8).unwrap();
    buffer.write_u16::<LittleEndian>(0).unwrap();
    buffer.write_u64::<LittleEndian>(16).unwrap();

    buffer.write_u64::<LittleEndian>(1).unwrap();
    buffer.write_u16::<LittleEndian>(270).unwrap();
    buffer.write_u16::<LittleEndian>(field_type).unwrap();
    buffer.write_u64::<LittleEndian>(count).unwrap();
    buffer.write_u64::<LittleEndian>(16).unwrap();
    buffer.write_u64::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

fn write_entry_le(buffer: &mut Vec<u8>, tag: u16, field_type: u16, count: u32, value: u32) {
    buffer.write_u16::<LittleEndian>(tag).unwrap();
    buffer.write_u16::<LittleEndian>(field_type).unwrap();
    buffer.write_u32::<LittleEndian>(count).unwrap();
    buffer.write_u32::<LittleEndian>(value).unwrap();
}

fn write_short_entry_be(buffer: &mut Vec<u8>, tag: u16, value: u16) {
    buffer.write_u16::<BigEndian>(tag).unwrap();
    buffer.write_u16::<BigEndian>(3).unwrap();
    buffer.write_u32::<BigEndian>(1).unwrap();
    // SHORT values sit in the first two bytes of the field
    buffer.write_u16::<BigEndian>(value).unwrap();
    buffer.write_u16::<BigEndian>(0).unwrap();
}

fn write_long_entry_be(buffer: &mut Vec<u8>, tag: u16, value: u32) {
    buffer.write_u16::<BigEndian>(tag).unwrap();
    buffer.write_u16::<BigEndian>(4).unwrap();
    buffer.write_u32::<BigEndian>(1).unwrap();
    buffer.write_u32::<BigEndian>(value).unwrap();
}

/// Fresh scratch directory unique to this process and test
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("microscoper-tiff-{}-{}", std::process::id(), name));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
