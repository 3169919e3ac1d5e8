//! TIFF writing utilities
//!
//! Alignment, padding and entry ordering helpers for the TIFF writer.

use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::IFDEntry;
use std::collections::HashSet;
use std::io::Write;

/// Align an offset to a 4-byte boundary
pub fn align_to_4_bytes(offset: u64) -> u64 {
    (offset + 3) & !3
}

/// Write the zero bytes that bring `data_len` to a 4-byte boundary
pub fn write_padding(writer: &mut impl Write, data_len: usize) -> TiffResult<()> {
    let padding = (4 - (data_len % 4)) % 4;
    if padding > 0 {
        writer.write_all(&[0u8; 3][..padding])?;
    }
    Ok(())
}

/// Write an offset-sized field: 4 bytes in classic TIFF, 8 in BigTIFF
pub fn write_offset(writer: &mut impl Write, value: u64, is_big_tiff: bool) -> TiffResult<()> {
    match is_big_tiff {
        true => writer.write_all(&value.to_le_bytes())?,
        false => writer.write_all(&(value as u32).to_le_bytes())?,
    }
    Ok(())
}

/// Size in bytes of an IFD with `entry_count` entries
pub fn ifd_size(entry_count: usize, is_big_tiff: bool) -> u64 {
    let entries = entry_count as u64;
    match is_big_tiff {
        // count, 20-byte entries, next offset
        true => 8 + 20 * entries + 8,
        // count, 12-byte entries, next offset
        false => 2 + 12 * entries + 4,
    }
}

/// Get IFD entries sorted by tag number, keeping the last occurrence of
/// any duplicated tag
pub fn get_unique_sorted_entries(entries: &[IFDEntry]) -> Vec<IFDEntry> {
    let mut seen_tags = HashSet::new();
    let mut unique_entries: Vec<IFDEntry> = entries.iter()
        .rev()
        .filter(|entry| seen_tags.insert(entry.tag))
        .cloned()
        .collect();

    unique_entries.sort_by_key(|entry| entry.tag);
    unique_entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment() {
        assert_eq!(align_to_4_bytes(0), 0);
        assert_eq!(align_to_4_bytes(5), 8);
        assert_eq!(align_to_4_bytes(8), 8);
    }

    #[test]
    fn test_unique_sorted_entries_keep_last() {
        let entries = vec![
            IFDEntry::new(258, 3, 1, 8),
            IFDEntry::new(256, 4, 1, 10),
            IFDEntry::new(258, 3, 1, 16),
        ];
        let sorted = get_unique_sorted_entries(&entries);
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].tag, 256);
        assert_eq!(sorted[1].value_offset, 16);
    }

    #[test]
    fn test_ifd_size() {
        assert_eq!(ifd_size(10, false), 126);
        assert_eq!(ifd_size(10, true), 216);
    }
}
