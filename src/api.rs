use std::io;
use std::path::{Path, PathBuf};
use log::info;

use crate::decoder::{ContainerDecoder, DecoderSession, OmeTiffDecoder, SessionConfig};
use crate::metadata::{MetadataDocument, MetadataResolver};
use crate::pipeline::errors::{ConvertError, ConvertResult};
use crate::pipeline::orchestrator::{BatchReport, ConversionOptions, ConversionOrchestrator};
use crate::utils::file_utils;
use crate::utils::logger::Logger;

/// Main interface to the microscoper library
pub struct Microscoper {
    logger: Logger,
    show_progress: bool,
}

impl Microscoper {
    /// Create a new Microscoper instance
    ///
    /// # Arguments
    /// * `log_file` - Optional path to log file, defaults to "microscoper.log"
    ///
    /// # Returns
    /// A Microscoper instance or an error if the log file cannot be created
    pub fn new(log_file: Option<&str>) -> io::Result<Self> {
        let log_path = log_file.unwrap_or("microscoper.log");
        let logger = Logger::new(log_path)?;
        Ok(Microscoper::with_logger(logger))
    }

    /// Create an instance around an existing logger
    pub fn with_logger(logger: Logger) -> Self {
        Microscoper { logger, show_progress: false }
    }

    /// Draw progress bars while converting
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// The component logger used for per-file operation lines
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Find input files below a folder
    ///
    /// # Arguments
    /// * `folder` - Folder searched recursively
    /// * `keyword` - Text every returned path contains
    ///
    /// # Returns
    /// Matching paths in sorted order, or a discovery error if `folder`
    /// cannot be read
    pub fn find_inputs(&self, folder: &Path, keyword: &str) -> ConvertResult<Vec<PathBuf>> {
        file_utils::find_files(folder, keyword).map_err(|source| ConvertError::Discovery {
            path: folder.to_path_buf(),
            source,
        })
    }

    /// Convert OME-TIFF files with the built-in decoder
    ///
    /// # Arguments
    /// * `paths` - Input files, converted in order
    /// * `options` - Output layout, mode and failure policy
    /// * `config` - Decoder session settings
    ///
    /// # Returns
    /// The batch report, or the first error under the fail-fast policy
    pub fn convert(&self, paths: &[PathBuf], options: ConversionOptions, config: SessionConfig) -> ConvertResult<BatchReport> {
        self.convert_with(Box::new(OmeTiffDecoder::new()), paths, options, config)
    }

    /// Convert files with any decoder backend
    ///
    /// One session is started for the whole batch and stopped once when
    /// the batch ends, whether or not a file failed.
    ///
    /// # Arguments
    /// * `backend` - Decoder for the input containers
    /// * `paths` - Input files, converted in order
    /// * `options` - Output layout, mode and failure policy
    /// * `config` - Decoder session settings
    ///
    /// # Returns
    /// The batch report, or the first error under the fail-fast policy
    pub fn convert_with(
        &self,
        backend: Box<dyn ContainerDecoder>,
        paths: &[PathBuf],
        options: ConversionOptions,
        config: SessionConfig,
    ) -> ConvertResult<BatchReport> {
        info!("Converting {} file(s)", paths.len());
        let session = DecoderSession::start(backend, config)
            .map_err(|e| ConvertError::Config(e.to_string()))?;

        let result = ConversionOrchestrator::new(&session, &self.logger, options)
            .with_progress(self.show_progress)
            .run(paths);
        session.shutdown();
        result
    }

    /// Read the metadata document of one OME-TIFF file
    ///
    /// # Arguments
    /// * `path` - Input container
    ///
    /// # Returns
    /// The parsed document, or `MetadataUnavailable`
    pub fn read_metadata(&self, path: &Path) -> ConvertResult<MetadataDocument> {
        let session = DecoderSession::start(Box::new(OmeTiffDecoder::new()), SessionConfig::default())
            .map_err(|e| ConvertError::Config(e.to_string()))?;
        let document = MetadataResolver::new(&session).parse(path);
        session.shutdown();
        document
    }
}
