//! Seekable reader trait
//!
//! The TIFF reader jumps between IFDs and strip data, so every source it
//! accepts must support random access.

use std::io::{Read, Seek};

/// Anything that can be read from and repositioned
pub trait SeekableReader: Read + Seek {}

impl<T: Read + Seek> SeekableReader for T {}
