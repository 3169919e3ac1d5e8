//! Serialisation of channel stacks and metadata
//!
//! Stacked mode writes one multi-page TIFF per channel, split mode one
//! single-page TIFF per plane. Both use the order of the stack.

use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::decoder::Plane;
use crate::metadata::{pretty_print, MetadataDocument};
use crate::pipeline::accumulator::ChannelStacks;
use crate::pipeline::errors::OutputError;
use crate::tiff::{TiffBuilder, TiffError};
use crate::utils::logger::Logger;

/// Name of the metadata sidecar inside each output directory
pub const METADATA_FILE_NAME: &str = "metadata.xml";

/// Writes channel stacks and metadata into an output directory
pub struct StackWriter<'a> {
    logger: &'a Logger,
}

impl<'a> StackWriter<'a> {
    pub fn new(logger: &'a Logger) -> Self {
        StackWriter { logger }
    }

    /// Write every channel stack into `output_directory`
    ///
    /// Returns the written files in the order they were produced.
    pub fn write(
        &self,
        stacks: &ChannelStacks,
        output_directory: &Path,
        big_format: bool,
        split_planes: bool,
    ) -> Result<Vec<PathBuf>, OutputError> {
        fs::create_dir_all(output_directory)
            .map_err(|e| OutputError::new(output_directory, e))?;

        let mut written = Vec::new();
        for (name, planes) in stacks.iter() {
            if planes.is_empty() {
                debug!("Channel '{}' has no planes, nothing written", name);
                continue;
            }
            if split_planes {
                for (index, plane) in planes.iter().enumerate() {
                    let target = output_directory.join(format!("{}_{}.tif", name, index + 1));
                    self.write_pages(&target, std::slice::from_ref(plane), big_format, false)?;
                    written.push(target);
                }
            } else {
                let target = output_directory.join(format!("{}.tif", name));
                self.write_pages(&target, planes, big_format, true)?;
                written.push(target);
            }
        }

        info!("Wrote {} file(s) for {} channel(s) to {}",
              written.len(), stacks.len(), output_directory.display());
        Ok(written)
    }

    /// Pretty-print the metadata document into `metadata.xml`
    pub fn persist_metadata(&self, doc: &MetadataDocument, output_directory: &Path) -> Result<PathBuf, OutputError> {
        let target = output_directory.join(METADATA_FILE_NAME);
        fs::create_dir_all(output_directory)
            .map_err(|e| OutputError::new(&target, e))?;

        let text = pretty_print(doc.to_xml())
            .map_err(|e| OutputError::new(&target, TiffError::GenericError(e.to_string())))?;
        fs::write(&target, text).map_err(|e| OutputError::new(&target, e))?;

        let _ = self.logger.log(&format!("Saved metadata to {}", target.display()));
        Ok(target)
    }

    /// Write `planes` as consecutive pages of one file
    ///
    /// A stacked file always records a leading page axis in its shape.
    fn write_pages(&self, target: &Path, planes: &[Plane], big_format: bool, stacked: bool) -> Result<(), OutputError> {
        let first = planes.first()
            .ok_or_else(|| OutputError::new(target, TiffError::UnsupportedLayout("no planes".to_string())))?;
        if let Some(odd) = planes.iter().position(|plane| !plane.same_layout(first)) {
            return Err(OutputError::new(target, TiffError::UnsupportedLayout(format!(
                "plane {} is {}x{} {}, the stack is {}x{} {}",
                odd + 1, planes[odd].width(), planes[odd].height(), planes[odd].pixel_type().ome_name(),
                first.width(), first.height(), first.pixel_type().ome_name()))));
        }

        let pixel_type = first.pixel_type();
        let mut builder = TiffBuilder::new(self.logger, big_format);
        for plane in planes {
            builder.add_gray_page(
                plane.width(),
                plane.height(),
                pixel_type.bits_per_sample(),
                pixel_type.sample_format(),
                plane.data(),
            ).map_err(|e| OutputError::new(target, e))?;
        }
        builder.set_description(0, &shape_description(planes.len(), first, stacked));

        builder.write(target).map_err(|e| OutputError::new(target, e))
    }
}

/// Shape annotation stored on the first page
fn shape_description(pages: usize, plane: &Plane, stacked: bool) -> String {
    if stacked || pages > 1 {
        format!("{{\"shape\": [{}, {}, {}]}}", pages, plane.height(), plane.width())
    } else {
        format!("{{\"shape\": [{}, {}]}}", plane.height(), plane.width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::PixelType;

    #[test]
    fn test_shape_description() {
        let plane = Plane::new(4, 3, PixelType::Uint16, vec![0; 24]).unwrap();
        assert_eq!(shape_description(5, &plane, true), "{\"shape\": [5, 3, 4]}");
        assert_eq!(shape_description(1, &plane, true), "{\"shape\": [1, 3, 4]}");
        assert_eq!(shape_description(1, &plane, false), "{\"shape\": [3, 4]}");
    }

    #[test]
    fn test_mixed_plane_sizes_rejected() {
        let dir = std::env::temp_dir().join(format!("microscoper-writer-{}", std::process::id()));
        let logger = Logger::null();
        let mut stacks = ChannelStacks::new();
        stacks.insert("DAPI".to_string(), vec![
            Plane::new(2, 2, PixelType::Uint8, vec![0; 4]).unwrap(),
            Plane::new(3, 2, PixelType::Uint8, vec![0; 6]).unwrap(),
        ]);

        let err = StackWriter::new(&logger).write(&stacks, &dir, false, false).unwrap_err();
        assert_eq!(err.target, dir.join("DAPI.tif"));
        assert!(matches!(err.source, TiffError::UnsupportedLayout(_)));
        assert!(!dir.join("DAPI.tif").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_stack_not_reported() {
        let dir = std::env::temp_dir().join(format!("microscoper-writer-empty-{}", std::process::id()));
        let logger = Logger::null();
        let mut stacks = ChannelStacks::new();
        stacks.insert("empty".to_string(), Vec::new());
        stacks.insert("DAPI".to_string(), vec![Plane::new(2, 1, PixelType::Uint8, vec![7, 8]).unwrap()]);

        let written = StackWriter::new(&logger).write(&stacks, &dir, false, false).unwrap();
        assert_eq!(written, vec![dir.join("DAPI.tif")]);
        assert!(!dir.join("empty.tif").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
