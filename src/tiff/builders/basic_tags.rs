//! Basic TIFF tag strategies
//!
//! Tags every grayscale page written by the stack writer carries:
//! dimensions, sample layout, the strip that holds the plane, and short
//! ASCII annotations.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::constants::{tags, field_types, photometric, compression};
use log::debug;

/// Adds basic TIFF tags to an IFD
pub struct BasicTagsBuilder;

impl BasicTagsBuilder {
    /// Add the tags describing a single-sample grayscale page
    pub fn add_basic_gray_tags(
        ifd: &mut IFD,
        width: u32,
        height: u32,
        bits_per_sample: u16,
        sample_format: u16,
    ) {
        debug!("Adding grayscale tags for {}x{} page, {} bits, format {}",
               width, height, bits_per_sample, sample_format);

        ifd.add_entry(IFDEntry::new(tags::IMAGE_WIDTH, field_types::LONG, 1, width as u64));
        ifd.add_entry(IFDEntry::new(tags::IMAGE_LENGTH, field_types::LONG, 1, height as u64));
        ifd.add_entry(IFDEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, 1, bits_per_sample as u64));
        ifd.add_entry(IFDEntry::new(tags::COMPRESSION, field_types::SHORT, 1, compression::NONE as u64));
        ifd.add_entry(IFDEntry::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            field_types::SHORT,
            1,
            photometric::BLACK_IS_ZERO as u64)
        );
        ifd.add_entry(IFDEntry::new(tags::SAMPLES_PER_PIXEL, field_types::SHORT, 1, 1));
        ifd.add_entry(IFDEntry::new(tags::ROWS_PER_STRIP, field_types::LONG, 1, height as u64));
        ifd.add_entry(IFDEntry::new(tags::SAMPLE_FORMAT, field_types::SHORT, 1, sample_format as u64));
    }

    /// Set up a single strip holding the whole page
    ///
    /// The StripOffsets value is a placeholder until the writer has laid
    /// out the file.
    pub fn setup_single_strip<'a>(
        ifd: &mut IFD,
        image_data: &mut BTreeMap<usize, Cow<'a, [u8]>>,
        ifd_index: usize,
        strip_data: Cow<'a, [u8]>,
        is_big_tiff: bool,
    ) {
        let offset_type = if is_big_tiff { field_types::LONG8 } else { field_types::LONG };

        ifd.add_entry(IFDEntry::new(tags::STRIP_OFFSETS, offset_type, 1, 0));
        ifd.add_entry(IFDEntry::new(tags::STRIP_BYTE_COUNTS, offset_type, 1, strip_data.len() as u64));

        image_data.insert(ifd_index, strip_data);
    }

    /// Add a NUL-terminated ASCII tag, inline when it fits in the entry
    pub fn add_ascii_tag(
        ifd: &mut IFD,
        external_data: &mut BTreeMap<(usize, u16), Vec<u8>>,
        ifd_index: usize,
        tag: u16,
        text: &str,
        is_big_tiff: bool,
    ) {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        let count = bytes.len() as u64;
        let inline_size = if is_big_tiff { 8 } else { 4 };

        if bytes.len() <= inline_size {
            let mut packed = [0u8; 8];
            packed[..bytes.len()].copy_from_slice(&bytes);
            ifd.add_entry(IFDEntry::new(tag, field_types::ASCII, count, u64::from_le_bytes(packed)));
        } else {
            ifd.add_entry(IFDEntry::new(tag, field_types::ASCII, count, 0));
            external_data.insert((ifd_index, tag), bytes);
        }
    }
}
