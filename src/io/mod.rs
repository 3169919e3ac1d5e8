//! I/O utilities for file handling
//!
//! Byte-order aware primitives shared by the TIFF reader and the
//! container backends built on top of it.

pub mod seekable;
pub mod byte_order;
