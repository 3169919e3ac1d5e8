//! TIFF file construction
//!
//! Collects grayscale pages and their annotations, then hands the whole
//! layout to the writer strategy. Page data is borrowed where possible so
//! that a channel stack is never copied just to be written.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;
use log::{debug, error};

use crate::tiff::constants::{tags, SOFTWARE_NAME};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::utils::logger::Logger;

use crate::tiff::builders::basic_tags::BasicTagsBuilder;
use crate::tiff::builders::writer::WriterBuilder;

/// Builder for creating TIFF files
pub struct TiffBuilder<'a> {
    logger: &'a Logger,
    is_big_tiff: bool,
    pub ifds: Vec<IFD>,
    image_data: BTreeMap<usize, Cow<'a, [u8]>>,
    external_data: BTreeMap<(usize, u16), Vec<u8>>,
}

impl<'a> TiffBuilder<'a> {
    /// Create a new TIFF builder
    pub fn new(logger: &'a Logger, is_big_tiff: bool) -> Self {
        debug!("Creating new TiffBuilder (is_big_tiff: {})", is_big_tiff);
        TiffBuilder {
            logger,
            is_big_tiff,
            ifds: Vec::new(),
            image_data: BTreeMap::new(),
            external_data: BTreeMap::new(),
        }
    }

    /// Add an IFD to the TIFF
    pub fn add_ifd(&mut self, ifd: IFD) -> usize {
        let ifd_index = self.ifds.len();
        self.ifds.push(ifd);
        ifd_index
    }

    /// Add a complete single-strip grayscale page
    ///
    /// `data` must hold exactly `width * height` little-endian samples of
    /// `bits_per_sample` bits.
    pub fn add_gray_page(
        &mut self,
        width: u32,
        height: u32,
        bits_per_sample: u16,
        sample_format: u16,
        data: impl Into<Cow<'a, [u8]>>,
    ) -> TiffResult<usize> {
        let data = data.into();
        let expected = width as usize * height as usize * (bits_per_sample as usize / 8);
        if data.len() != expected {
            return Err(TiffError::GenericError(format!(
                "Page of {}x{} at {} bits needs {} bytes, got {}",
                width, height, bits_per_sample, expected, data.len())));
        }

        let ifd_index = self.add_ifd(IFD::new(self.ifds.len(), 0));
        let ifd = &mut self.ifds[ifd_index];
        BasicTagsBuilder::add_basic_gray_tags(ifd, width, height, bits_per_sample, sample_format);
        BasicTagsBuilder::setup_single_strip(ifd, &mut self.image_data, ifd_index, data, self.is_big_tiff);
        BasicTagsBuilder::add_ascii_tag(
            ifd, &mut self.external_data, ifd_index, tags::SOFTWARE, SOFTWARE_NAME, self.is_big_tiff);

        Ok(ifd_index)
    }

    /// Set the ImageDescription of a page
    pub fn set_description(&mut self, ifd_index: usize, description: &str) {
        self.add_ascii_tag(ifd_index, tags::IMAGE_DESCRIPTION, description);
    }

    /// Add an ASCII tag to a page
    pub fn add_ascii_tag(&mut self, ifd_index: usize, tag: u16, text: &str) {
        if ifd_index >= self.ifds.len() {
            error!("Invalid IFD index {}, only have {} IFDs", ifd_index, self.ifds.len());
            return;
        }

        BasicTagsBuilder::add_ascii_tag(
            &mut self.ifds[ifd_index],
            &mut self.external_data,
            ifd_index,
            tag,
            text,
            self.is_big_tiff,
        );
    }

    /// Number of pages added so far
    pub fn page_count(&self) -> usize {
        self.ifds.len()
    }

    /// Write the TIFF file to disk
    pub fn write(&self, output_path: &Path) -> TiffResult<()> {
        self.logger.log(&format!("Writing {} page(s) to {}", self.ifds.len(), output_path.display()))?;

        WriterBuilder::write(
            self.is_big_tiff,
            &self.ifds,
            &self.image_data,
            &self.external_data,
            output_path,
        )
    }
}
