//! Utility modules for common functionality

pub mod logger;
pub mod progress;
pub mod file_utils;
pub(crate) mod write_utils;
pub(crate) mod tag_utils;
