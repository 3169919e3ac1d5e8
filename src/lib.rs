pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod decoder;
pub mod metadata;
pub mod pipeline;
pub mod config;
pub mod commands;
pub mod api;

pub use crate::api::Microscoper;

pub use config::Settings;
pub use decoder::{AxisSizes, Container, ContainerDecoder, DecoderSession, OmeTiffDecoder, PixelType, Plane, SessionConfig};
pub use metadata::{MetadataDocument, MetadataResolver};
pub use pipeline::{
    BatchReport, ChannelStacks, ConversionMode, ConversionOptions, ConversionOrchestrator, ConvertError,
    ConvertResult, FailurePolicy, PlaneAccumulator, StackWriter,
};
pub use tiff::{TiffBuilder, TiffReader};
