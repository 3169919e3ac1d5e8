//! Batch conversion command

use log::{error, info};
use std::path::PathBuf;

use crate::api::Microscoper;
use crate::commands::command_traits::Command;
use crate::commands::print_no_match;
use crate::config::Settings;
use crate::decoder::SessionConfig;
use crate::pipeline::errors::{ConvertError, ConvertResult};
use crate::pipeline::orchestrator::ConversionOptions;

/// Converts every matching file, images and metadata or metadata only
pub struct ConvertCommand<'a> {
    folder: PathBuf,
    keyword: String,
    session_config: SessionConfig,
    options: ConversionOptions,
    api: &'a Microscoper,
}

impl<'a> ConvertCommand<'a> {
    pub fn new(settings: &Settings, api: &'a Microscoper) -> ConvertResult<Self> {
        Ok(ConvertCommand {
            folder: settings.folder.clone(),
            keyword: settings.keyword.clone(),
            session_config: settings.session_config()?,
            options: settings.conversion_options(),
            api,
        })
    }
}

impl<'a> Command for ConvertCommand<'a> {
    fn execute(&self) -> ConvertResult<()> {
        let files = self.api.find_inputs(&self.folder, &self.keyword)?;
        if files.is_empty() {
            print_no_match(&self.keyword);
            return Ok(());
        }
        info!("Found {} file(s) matching '{}'", files.len(), self.keyword);

        let report = self.api.convert(&files, self.options, self.session_config.clone())?;
        let _ = self.api.logger().log(&format!(
            "Converted {} file(s), {} failed, {} skipped",
            report.converted.len(), report.failures.len(), report.skipped.len()));

        if !report.is_success() {
            for failure in &report.failures {
                error!("Failed: {}", failure);
            }
            return Err(ConvertError::BatchIncomplete {
                failed: report.failures.len(),
                attempted: report.attempted(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::logger::Logger;
    use std::fs;

    #[test]
    fn test_no_match_is_not_an_error() {
        let dir = std::env::temp_dir().join(format!("microscoper-cmd-empty-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("notes.txt"), b"").unwrap();

        let api = Microscoper::with_logger(Logger::null());
        let settings = Settings { folder: dir.clone(), ..Settings::default() };
        ConvertCommand::new(&settings, &api).unwrap().execute().unwrap();
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_folder_is_a_discovery_error() {
        let api = Microscoper::with_logger(Logger::null());
        let settings = Settings {
            folder: std::env::temp_dir().join("microscoper-cmd-missing-4242"),
            ..Settings::default()
        };

        let err = ConvertCommand::new(&settings, &api).unwrap().execute().unwrap_err();
        assert_eq!(err.stage(), "discovery");
    }
}
