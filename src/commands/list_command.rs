//! Listing of matching input files

use log::info;
use std::path::PathBuf;

use crate::api::Microscoper;
use crate::commands::command_traits::Command;
use crate::commands::print_no_match;
use crate::config::Settings;
use crate::pipeline::errors::ConvertResult;

const SEPARATOR: &str = "======================";

/// Prints every file the keyword matches, without starting a decoder
pub struct ListCommand<'a> {
    folder: PathBuf,
    keyword: String,
    api: &'a Microscoper,
}

impl<'a> ListCommand<'a> {
    pub fn new(settings: &Settings, api: &'a Microscoper) -> Self {
        ListCommand {
            folder: settings.folder.clone(),
            keyword: settings.keyword.clone(),
            api,
        }
    }

    /// Lines printed for `files`
    fn render(files: &[PathBuf]) -> Vec<String> {
        let mut lines: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
        lines.push(SEPARATOR.to_string());
        lines.push(format!("Total files found: {}", files.len()));
        lines.push(SEPARATOR.to_string());
        lines
    }
}

impl<'a> Command for ListCommand<'a> {
    fn execute(&self) -> ConvertResult<()> {
        let files = self.api.find_inputs(&self.folder, &self.keyword)?;
        if files.is_empty() {
            print_no_match(&self.keyword);
            return Ok(());
        }

        info!("Listing {} file(s) under {}", files.len(), self.folder.display());
        let _ = self.api.logger().log(&format!("Listed {} file(s) matching '{}'", files.len(), self.keyword));
        for line in Self::render(&files) {
            println!("{}", line);
        }
        Ok(())
    }
}
