//! Batch conversion
//!
//! Sequences metadata extraction, plane accumulation and stack writing
//! for each input file and applies the batch failure policy.

use log::{error, info};
use std::path::{Path, PathBuf};

use crate::decoder::DecoderSession;
use crate::metadata::MetadataResolver;
use crate::pipeline::accumulator::PlaneAccumulator;
use crate::pipeline::errors::{ConvertError, ConvertResult};
use crate::pipeline::stack_writer::StackWriter;
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;

/// What to extract from each file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionMode {
    /// Channel stacks plus metadata
    #[default]
    Images,
    /// Metadata only
    MetadataOnly,
}

/// What a batch does after a file fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failing file
    #[default]
    FailFast,
    /// Convert the remaining files and report every failure
    SkipAndReport,
}

/// Settings applied to every file of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversionOptions {
    pub big_format: bool,
    pub split_planes: bool,
    pub mode: ConversionMode,
    pub policy: FailurePolicy,
}

/// Outcome of one converted file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub input: PathBuf,
    pub output_directory: PathBuf,
    /// Channel names in output order, empty in metadata-only mode
    pub channels: Vec<String>,
    /// Every file written, `metadata.xml` last
    pub files_written: Vec<PathBuf>,
}

/// Outcome of a batch
#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<ConversionSummary>,
    pub failures: Vec<ConvertError>,
    /// Inputs the decoder does not recognise
    pub skipped: Vec<PathBuf>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of files a conversion was attempted for
    pub fn attempted(&self) -> usize {
        self.converted.len() + self.failures.len()
    }
}

/// Output directory of `path`: `_<stem>_` next to the input
///
/// Only the last extension is dropped, so `a.ome.tif` maps to `_a.ome_`.
pub fn output_directory_for(path: &Path) -> ConvertResult<PathBuf> {
    let canonical = path.canonicalize().map_err(|source| ConvertError::Discovery {
        path: path.to_path_buf(),
        source,
    })?;
    let stem = canonical.file_stem().ok_or_else(|| ConvertError::Config(format!(
        "{} has no file name", path.display())))?;
    let parent = canonical.parent().unwrap_or_else(|| Path::new("/"));

    Ok(parent.join(format!("_{}_", stem.to_string_lossy())))
}

/// Converts files through one decoder session
pub struct ConversionOrchestrator<'a> {
    session: &'a DecoderSession,
    logger: &'a Logger,
    options: ConversionOptions,
    show_progress: bool,
}

impl<'a> ConversionOrchestrator<'a> {
    pub fn new(session: &'a DecoderSession, logger: &'a Logger, options: ConversionOptions) -> Self {
        ConversionOrchestrator {
            session,
            logger,
            options,
            show_progress: false,
        }
    }

    /// Draw progress bars over files and planes
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert one file
    pub fn convert_file(&self, path: &Path) -> ConvertResult<ConversionSummary> {
        let output_directory = output_directory_for(path)?;
        info!("Converting {} into {}", path.display(), output_directory.display());
        let writer = StackWriter::new(self.logger);

        let (metadata, channels, mut files_written) = match self.options.mode {
            ConversionMode::MetadataOnly => {
                let metadata = MetadataResolver::new(self.session).parse(path)?;
                (metadata, Vec::new(), Vec::new())
            }
            ConversionMode::Images => {
                let accumulator = PlaneAccumulator::new(self.session, self.logger)
                    .with_progress(self.show_progress);
                let (metadata, stacks) = accumulator.extract_channels(path)?;
                let files = writer.write(
                    &stacks,
                    &output_directory,
                    self.options.big_format,
                    self.options.split_planes,
                ).map_err(|source| ConvertError::OutputWriteFailure {
                    path: path.to_path_buf(),
                    source,
                })?;
                let channels = stacks.names().map(str::to_string).collect();
                (metadata, channels, files)
            }
        };

        let metadata_file = writer.persist_metadata(&metadata, &output_directory)
            .map_err(|source| ConvertError::OutputWriteFailure {
                path: path.to_path_buf(),
                source,
            })?;
        files_written.push(metadata_file);

        let _ = self.logger.log(&format!(
            "Converted {} ({} file(s) written)", path.display(), files_written.len()));
        Ok(ConversionSummary {
            input: path.to_path_buf(),
            output_directory,
            channels,
            files_written,
        })
    }

    /// Convert every file of `paths` under the batch failure policy
    ///
    /// Under fail-fast the first error is returned as is.
    pub fn run(&self, paths: &[PathBuf]) -> ConvertResult<BatchReport> {
        let mut report = BatchReport::default();
        let progress = if self.show_progress {
            ProgressTracker::new(paths.len() as u64, "Converting files")
        } else {
            ProgressTracker::hidden(paths.len() as u64)
        };

        for path in paths {
            progress.increment(1);
            if !self.session.can_open(path) {
                info!("Skipping {}: not a {} container", path.display(), self.session.backend_name());
                report.skipped.push(path.clone());
                continue;
            }

            match self.convert_file(path) {
                Ok(summary) => report.converted.push(summary),
                Err(e) => match self.options.policy {
                    FailurePolicy::FailFast => {
                        progress.finish();
                        return Err(e);
                    }
                    FailurePolicy::SkipAndReport => {
                        error!("{}", e);
                        report.failures.push(e);
                    }
                },
            }
        }
        progress.finish();

        info!("Batch finished: {} converted, {} failed, {} skipped",
              report.converted.len(), report.failures.len(), report.skipped.len());
        Ok(report)
    }
}
