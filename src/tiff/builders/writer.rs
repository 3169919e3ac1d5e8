//! TIFF writing strategies
//!
//! Lays out a complete file as header, every IFD, out-of-line tag data
//! and finally the strip data of each page, then writes it in that order.
//! All values are little-endian.

use crate::tiff::ifd::IFD;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::constants::{header, tags};
use crate::utils::write_utils;
use log::debug;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

/// Handles writing TIFF files to disk
pub struct WriterBuilder;

impl WriterBuilder {
    /// Write a complete TIFF file to disk
    ///
    /// Fails with `ClassicTiffOverflow` before creating the file when a
    /// classic TIFF could not address its own contents.
    pub fn write(
        is_big_tiff: bool,
        ifds: &[IFD],
        image_data: &BTreeMap<usize, Cow<'_, [u8]>>,
        external_data: &BTreeMap<(usize, u16), Vec<u8>>,
        output_path: &Path,
    ) -> TiffResult<()> {
        Self::write_within(is_big_tiff, ifds, image_data, external_data, output_path, header::CLASSIC_MAX_OFFSET)
    }

    /// Write a complete TIFF file, refusing classic layouts larger than `classic_limit`
    fn write_within(
        is_big_tiff: bool,
        ifds: &[IFD],
        image_data: &BTreeMap<usize, Cow<'_, [u8]>>,
        external_data: &BTreeMap<(usize, u16), Vec<u8>>,
        output_path: &Path,
        classic_limit: u64,
    ) -> TiffResult<()> {
        let sorted_ifds = Self::prepare_sorted_ifds(ifds);

        let header_size = if is_big_tiff { header::BIG_HEADER_SIZE } else { header::CLASSIC_HEADER_SIZE };
        let (ifd_offsets, tag_data_offsets, total_size) = Self::calculate_offsets(
            &sorted_ifds, external_data, image_data, header_size, is_big_tiff);

        if !is_big_tiff && total_size > classic_limit {
            return Err(TiffError::ClassicTiffOverflow { required: total_size });
        }

        debug!("Writing {} pages ({} bytes) to {}", sorted_ifds.len(), total_size, output_path.display());

        let file = File::create(output_path)?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);

        Self::write_header(&mut writer, is_big_tiff)?;

        let first_ifd_offset = ifd_offsets.first().copied().unwrap_or(0);
        Self::write_first_ifd_offset(&mut writer, first_ifd_offset, is_big_tiff)?;

        Self::write_ifds(&mut writer, &sorted_ifds, &ifd_offsets, &tag_data_offsets, is_big_tiff)?;
        Self::write_external_data(&mut writer, external_data, &tag_data_offsets)?;
        Self::write_image_data(&mut writer, image_data, &tag_data_offsets)?;

        writer.flush()?;
        Ok(())
    }

    /// Prepare sorted IFDs with unique tags
    fn prepare_sorted_ifds(ifds: &[IFD]) -> Vec<IFD> {
        ifds.iter().map(|ifd| {
            let mut sorted_ifd = ifd.clone();
            sorted_ifd.entries = write_utils::get_unique_sorted_entries(&ifd.entries);
            sorted_ifd
        }).collect()
    }

    /// Calculate offsets for IFDs, external tag data and strips
    ///
    /// Returns the IFD offsets, the offset of every out-of-line payload
    /// keyed by (IFD index, tag), and the resulting file size.
    fn calculate_offsets(
        sorted_ifds: &[IFD],
        external_data: &BTreeMap<(usize, u16), Vec<u8>>,
        image_data: &BTreeMap<usize, Cow<'_, [u8]>>,
        header_size: u64,
        is_big_tiff: bool,
    ) -> (Vec<u64>, HashMap<(usize, u16), u64>, u64) {
        let mut current_offset = header_size;
        let mut ifd_offsets = Vec::with_capacity(sorted_ifds.len());
        let mut tag_data_offsets = HashMap::new();

        for ifd in sorted_ifds {
            ifd_offsets.push(current_offset);
            current_offset += write_utils::ifd_size(ifd.entries.len(), is_big_tiff);
        }

        for (key, data) in external_data {
            tag_data_offsets.insert(*key, current_offset);
            current_offset = write_utils::align_to_4_bytes(current_offset + data.len() as u64);
        }

        for (ifd_index, data) in image_data {
            tag_data_offsets.insert((*ifd_index, tags::STRIP_OFFSETS), current_offset);
            current_offset = write_utils::align_to_4_bytes(current_offset + data.len() as u64);
        }

        (ifd_offsets, tag_data_offsets, current_offset)
    }

    /// Write the byte order marker, version and placeholder IFD offset
    fn write_header(writer: &mut impl Write, is_big_tiff: bool) -> TiffResult<()> {
        writer.write_all(&header::LITTLE_ENDIAN_MARKER)?;

        if is_big_tiff {
            writer.write_all(&header::BIG_TIFF_VERSION.to_le_bytes())?;
            writer.write_all(&header::BIGTIFF_OFFSET_SIZE.to_le_bytes())?;
            writer.write_all(&[0u8, 0])?;  // Reserved
            writer.write_all(&[0u8; 8])?;
        } else {
            writer.write_all(&header::TIFF_VERSION.to_le_bytes())?;
            writer.write_all(&[0u8; 4])?;
        }

        Ok(())
    }

    /// Fill in the header's first IFD offset
    fn write_first_ifd_offset(writer: &mut (impl Write + Seek), offset: u64, is_big_tiff: bool) -> TiffResult<()> {
        let position = if is_big_tiff { 8 } else { 4 };
        writer.seek(SeekFrom::Start(position))?;
        write_utils::write_offset(writer, offset, is_big_tiff)
    }

    /// Write all IFDs to the file
    fn write_ifds(
        writer: &mut (impl Write + Seek),
        sorted_ifds: &[IFD],
        ifd_offsets: &[u64],
        tag_data_offsets: &HashMap<(usize, u16), u64>,
        is_big_tiff: bool,
    ) -> TiffResult<()> {
        for (i, ifd) in sorted_ifds.iter().enumerate() {
            let next_ifd_offset = ifd_offsets.get(i + 1).copied().unwrap_or(0);
            writer.seek(SeekFrom::Start(ifd_offsets[i]))?;
            Self::write_ifd(writer, ifd, next_ifd_offset, tag_data_offsets, i, is_big_tiff)?;
        }

        Ok(())
    }

    /// Write all external tag data
    fn write_external_data(
        writer: &mut (impl Write + Seek),
        external_data: &BTreeMap<(usize, u16), Vec<u8>>,
        tag_data_offsets: &HashMap<(usize, u16), u64>,
    ) -> TiffResult<()> {
        for (key, data) in external_data {
            if let Some(offset) = tag_data_offsets.get(key) {
                writer.seek(SeekFrom::Start(*offset))?;
                writer.write_all(data)?;
                write_utils::write_padding(writer, data.len())?;
            }
        }

        Ok(())
    }

    /// Write the strip of every page
    fn write_image_data(
        writer: &mut (impl Write + Seek),
        image_data: &BTreeMap<usize, Cow<'_, [u8]>>,
        tag_data_offsets: &HashMap<(usize, u16), u64>,
    ) -> TiffResult<()> {
        for (ifd_index, data) in image_data {
            if let Some(offset) = tag_data_offsets.get(&(*ifd_index, tags::STRIP_OFFSETS)) {
                writer.seek(SeekFrom::Start(*offset))?;
                writer.write_all(data)?;
                write_utils::write_padding(writer, data.len())?;
            }
        }

        Ok(())
    }

    /// Write one IFD, substituting laid-out offsets for placeholders
    fn write_ifd(
        writer: &mut (impl Write + Seek),
        ifd: &IFD,
        next_offset: u64,
        tag_offsets: &HashMap<(usize, u16), u64>,
        ifd_index: usize,
        is_big_tiff: bool,
    ) -> TiffResult<()> {
        match is_big_tiff {
            true => writer.write_all(&(ifd.entries.len() as u64).to_le_bytes())?,
            false => writer.write_all(&(ifd.entries.len() as u16).to_le_bytes())?,
        }

        for entry in &ifd.entries {
            let value_offset = tag_offsets.get(&(ifd_index, entry.tag))
                .copied()
                .unwrap_or(entry.value_offset);

            writer.write_all(&entry.tag.to_le_bytes())?;
            writer.write_all(&entry.field_type.to_le_bytes())?;
            write_utils::write_offset(writer, entry.count, is_big_tiff)?;
            write_utils::write_offset(writer, value_offset, is_big_tiff)?;
        }

        write_utils::write_offset(writer, next_offset, is_big_tiff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiff::ifd::IFDEntry;

    fn one_page() -> (Vec<IFD>, BTreeMap<usize, Cow<'static, [u8]>>) {
        let mut ifd = IFD::new(0, 0);
        ifd.add_entry(IFDEntry::new(tags::IMAGE_WIDTH, 4, 1, 8));
        ifd.add_entry(IFDEntry::new(tags::IMAGE_LENGTH, 4, 1, 8));
        ifd.add_entry(IFDEntry::new(tags::STRIP_OFFSETS, 4, 1, 0));
        ifd.add_entry(IFDEntry::new(tags::STRIP_BYTE_COUNTS, 4, 1, 64));
        let mut image_data = BTreeMap::new();
        image_data.insert(0, Cow::Owned(vec![0u8; 64]));
        (vec![ifd], image_data)
    }

    #[test]
    fn test_offsets_cover_every_section() {
        let (ifds, image_data) = one_page();
        let sorted = WriterBuilder::prepare_sorted_ifds(&ifds);
        let (ifd_offsets, tag_offsets, total) = WriterBuilder::calculate_offsets(
            &sorted, &BTreeMap::new(), &image_data, header::CLASSIC_HEADER_SIZE, false);

        assert_eq!(ifd_offsets, vec![header::CLASSIC_HEADER_SIZE]);
        let strip = tag_offsets[&(0, tags::STRIP_OFFSETS)];
        assert!(strip >= header::CLASSIC_HEADER_SIZE + write_utils::ifd_size(4, false));
        assert_eq!(total, write_utils::align_to_4_bytes(strip + 64));
    }

    #[test]
    fn test_oversized_classic_file_never_created() {
        let dir = std::env::temp_dir().join(format!("microscoper-overflow-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("too_big.tif");
        let (ifds, image_data) = one_page();

        let result = WriterBuilder::write_within(false, &ifds, &image_data, &BTreeMap::new(), &path, 32);
        assert!(matches!(result, Err(TiffError::ClassicTiffOverflow { required }) if required > 32));
        assert!(!path.exists());

        WriterBuilder::write_within(true, &ifds, &image_data, &BTreeMap::new(), &path, 32).unwrap();
        assert!(path.exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
