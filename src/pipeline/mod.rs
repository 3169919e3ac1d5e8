//! Conversion pipeline
//!
//! Turns each input container into per-channel TIFF files and a
//! `metadata.xml` sidecar inside `_<stem>_/` next to the input.

pub mod errors;
pub mod accumulator;
pub mod stack_writer;
pub mod orchestrator;
#[cfg(test)]
mod tests;

pub use errors::{ConvertError, ConvertResult, OutputError};
pub use accumulator::{ChannelStacks, PlaneAccumulator};
pub use stack_writer::{StackWriter, METADATA_FILE_NAME};
pub use orchestrator::{
    output_directory_for, BatchReport, ConversionMode, ConversionOptions, ConversionOrchestrator,
    ConversionSummary, FailurePolicy,
};
