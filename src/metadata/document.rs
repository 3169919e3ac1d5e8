//! OME-XML metadata documents

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use thiserror::Error;

/// A metadata document that could not be parsed
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("malformed metadata XML at byte {position}: {reason}")]
    Malformed { position: u64, reason: String },

    #[error("metadata document has no root element")]
    Empty,
}

/// `Channel` element of a Pixels block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMetadata {
    pub id: Option<String>,
    pub name: Option<String>,
    pub samples_per_pixel: Option<u32>,
}

/// Attributes of a `Pixels` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelsMetadata {
    pub dimension_order: Option<String>,
    pub pixel_type: Option<String>,
    pub size_x: Option<u32>,
    pub size_y: Option<u32>,
    pub size_c: Option<u32>,
    pub size_z: Option<u32>,
    pub size_t: Option<u32>,
}

/// One `Image` element with its pixels description and channels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    pub id: Option<String>,
    pub name: Option<String>,
    pub pixels: PixelsMetadata,
    pub channels: Vec<ChannelMetadata>,
}

/// Parsed OME-XML document
///
/// Keeps the source text so the document can be persisted unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataDocument {
    xml: String,
    images: Vec<ImageMetadata>,
}

impl MetadataDocument {
    /// Parse an OME-XML document
    pub fn from_xml(xml: impl Into<String>) -> Result<Self, MetadataError> {
        let xml = xml.into();
        let images = scan_images(&xml)?;
        Ok(MetadataDocument { xml, images })
    }

    /// Canonical textual form of the document
    pub fn to_xml(&self) -> &str {
        &self.xml
    }

    pub fn images(&self) -> &[ImageMetadata] {
        &self.images
    }

    /// Channels of the first image
    pub fn channels(&self) -> &[ChannelMetadata] {
        self.images.first().map(|image| image.channels.as_slice()).unwrap_or(&[])
    }
}

fn malformed(reader: &Reader<&[u8]>, reason: impl ToString) -> MetadataError {
    MetadataError::Malformed {
        position: reader.error_position(),
        reason: reason.to_string(),
    }
}

fn attributes(reader: &Reader<&[u8]>, element: &BytesStart) -> Result<HashMap<String, String>, MetadataError> {
    let mut map = HashMap::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| malformed(reader, e))?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute.unescape_value().map_err(|e| malformed(reader, e))?;
        map.insert(key, value.into_owned());
    }
    Ok(map)
}

fn number(map: &HashMap<String, String>, key: &str) -> Option<u32> {
    map.get(key).and_then(|value| value.trim().parse().ok())
}

/// Collect every Image with its Pixels attributes and Channel elements
fn scan_images(xml: &str) -> Result<Vec<ImageMetadata>, MetadataError> {
    let mut reader = Reader::from_str(xml);
    let mut images: Vec<ImageMetadata> = Vec::new();
    let mut saw_root = false;
    let mut in_image = false;
    let mut in_pixels = false;

    loop {
        let (element, has_body) = match reader.read_event() {
            Ok(Event::Start(e)) => (e, true),
            Ok(Event::Empty(e)) => (e, false),
            Ok(Event::End(e)) => {
                match e.local_name().as_ref() {
                    b"Image" => in_image = false,
                    b"Pixels" => in_pixels = false,
                    _ => {}
                }
                continue;
            }
            Ok(Event::Eof) => break,
            Ok(_) => continue,
            Err(e) => return Err(malformed(&reader, e)),
        };
        saw_root = true;

        match element.local_name().as_ref() {
            b"Image" => {
                let attrs = attributes(&reader, &element)?;
                images.push(ImageMetadata {
                    id: attrs.get("ID").cloned(),
                    name: attrs.get("Name").cloned(),
                    ..ImageMetadata::default()
                });
                in_image = has_body;
            }
            b"Pixels" if in_image => {
                let attrs = attributes(&reader, &element)?;
                if let Some(image) = images.last_mut() {
                    image.pixels = PixelsMetadata {
                        dimension_order: attrs.get("DimensionOrder").cloned(),
                        pixel_type: attrs.get("Type").cloned(),
                        size_x: number(&attrs, "SizeX"),
                        size_y: number(&attrs, "SizeY"),
                        size_c: number(&attrs, "SizeC"),
                        size_z: number(&attrs, "SizeZ"),
                        size_t: number(&attrs, "SizeT"),
                    };
                }
                in_pixels = has_body;
            }
            b"Channel" if in_pixels => {
                let attrs = attributes(&reader, &element)?;
                if let Some(image) = images.last_mut() {
                    image.channels.push(ChannelMetadata {
                        id: attrs.get("ID").cloned(),
                        name: attrs.get("Name").cloned(),
                        samples_per_pixel: number(&attrs, "SamplesPerPixel"),
                    });
                }
            }
            _ => {}
        }
    }

    if !saw_root {
        return Err(MetadataError::Empty);
    }
    Ok(images)
}
