//! Strip-based page decoding
//!
//! Reads the pixel data of one grayscale page stored in strips,
//! decompressing each strip and returning little-endian samples.

use log::debug;
use std::io::SeekFrom;

use crate::compression::CompressionFactory;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{compression, predictor, sample_format, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::tiff::validation;
use crate::utils::tag_utils;

/// Decoded pixels of one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageData {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: u16,
    pub sample_format: u16,
    /// Row-major little-endian samples
    pub data: Vec<u8>,
}

/// Reads image data from a stripped page
pub struct StripReader<'a> {
    /// Reader that parsed the page's IFD
    tiff_reader: &'a TiffReader,
    /// IFD containing the page metadata
    ifd: &'a IFD,
}

impl<'a> StripReader<'a> {
    /// Create a new strip reader for one page
    pub fn new(tiff_reader: &'a TiffReader, ifd: &'a IFD) -> Self {
        StripReader { tiff_reader, ifd }
    }

    /// Bits per sample and sample format of the page, checking that the
    /// page is a single-sample, strip-organised image we can decode
    fn sample_layout(&self) -> TiffResult<(u16, u16)> {
        if self.ifd.get_samples_per_pixel() != 1 {
            return Err(TiffError::UnsupportedLayout(format!(
                "{} samples per pixel", self.ifd.get_samples_per_pixel())));
        }
        if self.ifd.has_tag(tags::TILE_WIDTH) || self.ifd.has_tag(tags::TILE_OFFSETS) {
            return Err(TiffError::UnsupportedLayout("tiled page".to_string()));
        }
        let predictor = self.ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE as u64);
        if predictor != predictor::NONE as u64 {
            return Err(TiffError::UnsupportedLayout(format!("predictor {}", predictor)));
        }

        let bits = self.ifd.get_tag_value(tags::BITS_PER_SAMPLE).unwrap_or(1);
        if !matches!(bits, 8 | 16 | 32 | 64) {
            return Err(TiffError::UnsupportedLayout(format!("{} bits per sample", bits)));
        }
        let format = self.ifd.get_tag_value(tags::SAMPLE_FORMAT)
            .unwrap_or(sample_format::UNSIGNED as u64);

        Ok((bits as u16, format as u16))
    }

    /// Read and decompress every strip of the page
    pub fn read_page(&self, reader: &mut dyn SeekableReader) -> TiffResult<PageData> {
        let (width, height) = self.ifd.get_dimensions()
            .ok_or(TiffError::MissingDimensions)?;
        let (bits_per_sample, sample_format) = self.sample_layout()?;
        let bytes_per_sample = (bits_per_sample / 8) as usize;
        let expected = (width as usize).checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(bytes_per_sample))
            .ok_or_else(|| TiffError::UnsupportedLayout(format!("{}x{} page is too large", width, height)))?;

        let code = self.ifd.get_tag_value(tags::COMPRESSION).unwrap_or(compression::NONE as u64);
        let decompressor = CompressionFactory::create_handler(code)?;

        let offsets = self.tiff_reader.read_tag_values(reader, self.ifd, tags::STRIP_OFFSETS)?;
        let byte_counts = self.tiff_reader.read_tag_values(reader, self.ifd, tags::STRIP_BYTE_COUNTS)?;
        if offsets.len() != byte_counts.len() {
            return Err(TiffError::GenericError(format!(
                "{} strip offsets but {} strip byte counts", offsets.len(), byte_counts.len())));
        }

        let file_size = validation::get_file_size(reader)?;
        let mut data = Vec::with_capacity(expected.min(usize::try_from(file_size).unwrap_or(usize::MAX)));
        for (&offset, &count) in offsets.iter().zip(byte_counts.iter()) {
            validation::validate_data_range(offset, count, file_size)?;
            let mut strip = vec![0u8; count as usize];
            reader.seek(SeekFrom::Start(offset))?;
            reader.read_exact(&mut strip)?;
            data.extend_from_slice(&decompressor.decompress(&strip)?);
        }

        debug!("Page #{}: {} strips, {} bytes ({} via {})",
               self.ifd.number, offsets.len(), data.len(), expected, tag_utils::get_compression_name(code));

        if data.len() < expected {
            return Err(TiffError::GenericError(format!(
                "Page #{} holds {} bytes, expected {}", self.ifd.number, data.len(), expected)));
        }
        data.truncate(expected);
        self.tiff_reader.handler()?.normalize_samples(&mut data, bytes_per_sample);

        Ok(PageData {
            width: width as u32,
            height: height as u32,
            bits_per_sample,
            sample_format,
            data,
        })
    }
}
