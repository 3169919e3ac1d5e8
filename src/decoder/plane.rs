//! Decoded planes and their sample types

use crate::decoder::errors::{DecodeError, DecodeResult};
use crate::tiff::sample_format;

/// Element type of a plane's samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float,
    Double,
}

impl PixelType {
    /// Parse an OME `Type` attribute such as `uint16`
    pub fn from_ome(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "int8" => Some(PixelType::Int8),
            "uint8" => Some(PixelType::Uint8),
            "int16" => Some(PixelType::Int16),
            "uint16" => Some(PixelType::Uint16),
            "int32" => Some(PixelType::Int32),
            "uint32" => Some(PixelType::Uint32),
            "float" => Some(PixelType::Float),
            "double" => Some(PixelType::Double),
            _ => None,
        }
    }

    /// Map a TIFF BitsPerSample / SampleFormat pair back to a pixel type
    pub fn from_tiff(bits_per_sample: u16, format: u16) -> Option<Self> {
        match (bits_per_sample, format) {
            (8, sample_format::SIGNED) => Some(PixelType::Int8),
            (8, sample_format::UNSIGNED) => Some(PixelType::Uint8),
            (16, sample_format::SIGNED) => Some(PixelType::Int16),
            (16, sample_format::UNSIGNED) => Some(PixelType::Uint16),
            (32, sample_format::SIGNED) => Some(PixelType::Int32),
            (32, sample_format::UNSIGNED) => Some(PixelType::Uint32),
            (32, sample_format::IEEEFP) => Some(PixelType::Float),
            (64, sample_format::IEEEFP) => Some(PixelType::Double),
            _ => None,
        }
    }

    /// The OME name of the type
    pub fn ome_name(&self) -> &'static str {
        match self {
            PixelType::Int8 => "int8",
            PixelType::Uint8 => "uint8",
            PixelType::Int16 => "int16",
            PixelType::Uint16 => "uint16",
            PixelType::Int32 => "int32",
            PixelType::Uint32 => "uint32",
            PixelType::Float => "float",
            PixelType::Double => "double",
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        match self {
            PixelType::Int8 | PixelType::Uint8 => 1,
            PixelType::Int16 | PixelType::Uint16 => 2,
            PixelType::Int32 | PixelType::Uint32 | PixelType::Float => 4,
            PixelType::Double => 8,
        }
    }

    pub fn bits_per_sample(&self) -> u16 {
        (self.bytes_per_sample() * 8) as u16
    }

    /// TIFF SampleFormat value for the type
    pub fn sample_format(&self) -> u16 {
        match self {
            PixelType::Int8 | PixelType::Int16 | PixelType::Int32 => sample_format::SIGNED,
            PixelType::Uint8 | PixelType::Uint16 | PixelType::Uint32 => sample_format::UNSIGNED,
            PixelType::Float | PixelType::Double => sample_format::IEEEFP,
        }
    }
}

/// One two-dimensional image of a container
///
/// Samples are row-major and little-endian, `width * height` of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    width: u32,
    height: u32,
    pixel_type: PixelType,
    data: Vec<u8>,
}

impl Plane {
    /// Wrap decoded samples, checking the buffer matches the dimensions
    pub fn new(width: u32, height: u32, pixel_type: PixelType, data: Vec<u8>) -> DecodeResult<Self> {
        let expected = width as usize * height as usize * pixel_type.bytes_per_sample();
        if data.len() != expected {
            return Err(DecodeError::UnsupportedContainer(format!(
                "plane of {}x{} {} needs {} bytes, got {}",
                width, height, pixel_type.ome_name(), expected, data.len()
            )));
        }
        Ok(Plane { width, height, pixel_type, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether two planes can share one stack file
    pub fn same_layout(&self, other: &Plane) -> bool {
        self.width == other.width && self.height == other.height && self.pixel_type == other.pixel_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ome_type_names() {
        assert_eq!(PixelType::from_ome("uint16"), Some(PixelType::Uint16));
        assert_eq!(PixelType::from_ome("Float"), Some(PixelType::Float));
        assert_eq!(PixelType::from_ome("bit"), None);
        assert_eq!(PixelType::Double.ome_name(), "double");
    }

    #[test]
    fn test_tiff_layout_mapping() {
        for ty in [
            PixelType::Int8, PixelType::Uint8, PixelType::Int16, PixelType::Uint16,
            PixelType::Int32, PixelType::Uint32, PixelType::Float, PixelType::Double,
        ] {
            assert_eq!(PixelType::from_tiff(ty.bits_per_sample(), ty.sample_format()), Some(ty));
        }
        assert_eq!(PixelType::from_tiff(16, sample_format::IEEEFP), None);
    }

    #[test]
    fn test_plane_size_check() {
        assert!(Plane::new(2, 2, PixelType::Uint16, vec![0; 8]).is_ok());
        assert!(Plane::new(2, 2, PixelType::Uint16, vec![0; 7]).is_err());
    }
}
