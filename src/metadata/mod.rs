//! Acquisition metadata
//!
//! Parses the OME-XML document of a container, resolves channel names
//! from it and renders it for `metadata.xml`.

pub mod document;
pub mod pretty;
pub mod resolver;

pub use document::{ChannelMetadata, ImageMetadata, MetadataDocument, MetadataError, PixelsMetadata};
pub use pretty::pretty_print;
pub use resolver::{sanitize_channel_name, MetadataResolver};
