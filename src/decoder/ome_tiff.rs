//! OME-TIFF container backend
//!
//! An OME-TIFF keeps its OME-XML document in the ImageDescription of the
//! first page and stores every (c, z, t) plane as one page. Pages follow
//! the DimensionOrder of the first image's Pixels element, with X and Y
//! innermost.

use log::{debug, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::decoder::errors::{DecodeError, DecodeResult};
use crate::decoder::plane::{PixelType, Plane};
use crate::decoder::session::SessionConfig;
use crate::decoder::{AxisSizes, Container, ContainerDecoder};
use crate::metadata::MetadataDocument;
use crate::tiff::{tags, StripReader, TiffReader, TIFF};

/// File name suffixes recognised as OME-TIFF
const EXTENSIONS: [&str; 4] = [".ome.tif", ".ome.tiff", ".ome.tf2", ".ome.btf"];

/// Order used when the document does not name one
const DEFAULT_DIMENSION_ORDER: &str = "XYZCT";

/// Decoder for OME-TIFF files
#[derive(Debug, Default, Clone, Copy)]
pub struct OmeTiffDecoder;

impl OmeTiffDecoder {
    pub fn new() -> Self {
        OmeTiffDecoder
    }

    /// Parse the file's page structure and its OME-XML document
    fn load(path: &Path) -> DecodeResult<(BufReader<File>, TiffReader, TIFF, MetadataDocument)> {
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file);
        let mut tiff_reader = TiffReader::new();
        let tiff = tiff_reader.read(&mut reader)?;

        let first = tiff.main_ifd()
            .ok_or_else(|| DecodeError::MissingMetadata(format!("{} has no pages", path.display())))?;
        if !first.has_tag(tags::IMAGE_DESCRIPTION) {
            return Err(DecodeError::MissingMetadata(format!(
                "{} has no ImageDescription", path.display())));
        }
        let xml = tiff_reader.read_ascii(&mut reader, first, tags::IMAGE_DESCRIPTION)?;
        let document = MetadataDocument::from_xml(xml)?;
        if document.images().is_empty() {
            return Err(DecodeError::MissingMetadata(format!(
                "{} has no OME Image element", path.display())));
        }

        Ok((reader, tiff_reader, tiff, document))
    }
}

impl ContainerDecoder for OmeTiffDecoder {
    fn name(&self) -> &str {
        "OME-TIFF"
    }

    fn can_open(&self, path: &Path) -> bool {
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().to_ascii_lowercase(),
            None => return false,
        };
        EXTENSIONS.iter().any(|ext| name.ends_with(ext))
    }

    fn open(&self, path: &Path, config: &SessionConfig) -> DecodeResult<Box<dyn Container>> {
        let (reader, tiff_reader, tiff, document) = Self::load(path)?;
        let pixels = &document.images()[0].pixels;

        let sizes = AxisSizes::new(
            pixels.size_c.unwrap_or(1).max(1) as usize,
            pixels.size_z.unwrap_or(1).max(1) as usize,
            pixels.size_t.unwrap_or(1).max(1) as usize,
        );
        let order = DimensionOrder::parse(
            pixels.dimension_order.as_deref().unwrap_or(DEFAULT_DIMENSION_ORDER))?;
        let declared_type = pixels.pixel_type.as_deref().and_then(PixelType::from_ome);

        // Hyperstacks are handed back as-is so the caller can reject them by shape
        if sizes.is_four_dimensional() {
            let planes = sizes.total_planes().ok_or_else(|| DecodeError::UnsupportedContainer(format!(
                "{} declares C={} Z={} T={}, too many planes", path.display(), sizes.c, sizes.z, sizes.t)))?;
            if tiff.ifd_count() < planes {
                return Err(DecodeError::UnsupportedContainer(format!(
                    "{} declares {} planes but holds {} pages",
                    path.display(), planes, tiff.ifd_count())));
            }
        }
        debug!("{}: C={} Z={} T={} order {}", path.display(), sizes.c, sizes.z, sizes.t, order.name);

        Ok(Box::new(OmeTiffContainer {
            reader,
            tiff_reader,
            tiff,
            sizes,
            order,
            declared_type,
            max_plane_bytes: config.max_heap_bytes,
        }))
    }

    fn metadata(&self, path: &Path) -> DecodeResult<MetadataDocument> {
        let (_, _, _, document) = Self::load(path)?;
        Ok(document)
    }
}

/// Which of Z, C and T varies fastest across pages
#[derive(Debug, Clone, PartialEq, Eq)]
struct DimensionOrder {
    name: String,
    /// Axes after X and Y, fastest first
    axes: [char; 3],
}

impl DimensionOrder {
    fn parse(order: &str) -> DecodeResult<Self> {
        let upper = order.trim().to_ascii_uppercase();
        let chars: Vec<char> = upper.chars().collect();
        let valid = chars.len() == 5
            && chars[0] == 'X'
            && chars[1] == 'Y'
            && ['Z', 'C', 'T'].iter().all(|axis| chars[2..].contains(axis));
        if !valid {
            return Err(DecodeError::UnsupportedContainer(format!("dimension order '{}'", order)));
        }
        Ok(DimensionOrder {
            name: upper,
            axes: [chars[2], chars[3], chars[4]],
        })
    }

    /// Page index of plane (c, z, t), `None` when it cannot be addressed
    fn page_index(&self, sizes: AxisSizes, c: usize, z: usize, t: usize) -> Option<usize> {
        let mut index: usize = 0;
        let mut stride: usize = 1;
        for axis in self.axes {
            let (coordinate, extent) = match axis {
                'Z' => (z, sizes.z),
                'C' => (c, sizes.c),
                _ => (t, sizes.t),
            };
            index = index.checked_add(coordinate.checked_mul(stride)?)?;
            stride = stride.checked_mul(extent)?;
        }
        Some(index)
    }
}

/// An open OME-TIFF file
struct OmeTiffContainer {
    reader: BufReader<File>,
    tiff_reader: TiffReader,
    tiff: TIFF,
    sizes: AxisSizes,
    order: DimensionOrder,
    declared_type: Option<PixelType>,
    max_plane_bytes: u64,
}

impl Container for OmeTiffContainer {
    fn axis_sizes(&self) -> AxisSizes {
        self.sizes
    }

    fn read_plane(&mut self, c: usize, z: usize, t: usize) -> DecodeResult<Plane> {
        if c >= self.sizes.c || z >= self.sizes.z || t >= self.sizes.t {
            return Err(DecodeError::PlaneOutOfRange { c, z, t });
        }
        let index = self.order.page_index(self.sizes, c, z, t)
            .ok_or(DecodeError::PlaneOutOfRange { c, z, t })?;
        let ifd = self.tiff.ifds.get(index)
            .ok_or(DecodeError::PlaneOutOfRange { c, z, t })?;

        if let Some((width, height)) = ifd.get_dimensions() {
            let bytes_per_sample = ifd.get_tag_value(tags::BITS_PER_SAMPLE).unwrap_or(8).div_ceil(8);
            let required = width.saturating_mul(height).saturating_mul(bytes_per_sample);
            if required > self.max_plane_bytes {
                return Err(DecodeError::MemoryLimit { required, limit: self.max_plane_bytes });
            }
        }

        let page = StripReader::new(&self.tiff_reader, ifd).read_page(&mut self.reader)?;
        let pixel_type = PixelType::from_tiff(page.bits_per_sample, page.sample_format)
            .ok_or_else(|| DecodeError::UnsupportedContainer(format!(
                "{}-bit samples with sample format {}", page.bits_per_sample, page.sample_format)))?;
        if let Some(declared) = self.declared_type {
            if declared != pixel_type {
                warn!("Page {} stores {} samples, metadata declares {}",
                      index, pixel_type.ome_name(), declared.ome_name());
            }
        }

        Plane::new(page.width, page.height, pixel_type, page.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_recognised_extensions() {
        let decoder = OmeTiffDecoder::new();
        assert!(decoder.can_open(&PathBuf::from("/data/a.ome.tif")));
        assert!(decoder.can_open(&PathBuf::from("B.OME.TIFF")));
        assert!(decoder.can_open(&PathBuf::from("scan.ome.btf")));
        assert!(!decoder.can_open(&PathBuf::from("plain.tif")));
        assert!(!decoder.can_open(&PathBuf::from("notes.txt")));
    }

    #[test]
    fn test_dimension_order_parse() {
        assert!(DimensionOrder::parse("XYZCT").is_ok());
        assert!(DimensionOrder::parse("xyctz").is_ok());
        assert!(DimensionOrder::parse("XYZZT").is_err());
        assert!(DimensionOrder::parse("ZCTXY").is_err());
    }

    #[test]
    fn test_page_index() {
        let sizes = AxisSizes::new(2, 3, 1);
        let xyzct = DimensionOrder::parse("XYZCT").unwrap();
        assert_eq!(xyzct.page_index(sizes, 0, 0, 0), Some(0));
        assert_eq!(xyzct.page_index(sizes, 0, 2, 0), Some(2));
        assert_eq!(xyzct.page_index(sizes, 1, 0, 0), Some(3));
        assert_eq!(xyzct.page_index(sizes, 1, 2, 0), Some(5));

        let xyczt = DimensionOrder::parse("XYCZT").unwrap();
        assert_eq!(xyczt.page_index(sizes, 1, 0, 0), Some(1));
        assert_eq!(xyczt.page_index(sizes, 0, 1, 0), Some(2));
        assert_eq!(xyczt.page_index(sizes, 1, 2, 0), Some(5));
    }
}
