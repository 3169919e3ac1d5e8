//! TIFF builder strategy modules
//!
//! Strategy implementations used by the TiffBuilder, split between
//! tag population and the on-disk layout.

pub mod basic_tags;
pub mod writer;
