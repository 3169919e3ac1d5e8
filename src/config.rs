//! Run settings
//!
//! Settings start from built-in defaults, are overlaid by the optional
//! `[microscoper]` table of a TOML file and finally by command-line flags.

use clap::ArgMatches;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

use crate::decoder::SessionConfig;
use crate::pipeline::errors::{ConvertError, ConvertResult};
use crate::pipeline::orchestrator::{ConversionMode, ConversionOptions, FailurePolicy};

pub const DEFAULT_FOLDER: &str = "./";
pub const DEFAULT_KEYWORD: &str = ".ome.tif";
pub const DEFAULT_MEMORY: &str = crate::decoder::session::DEFAULT_MEMORY;

/// Table holding the settings inside a config file
const CONFIG_TABLE: &str = "microscoper";

/// Effective settings of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub folder: PathBuf,
    pub keyword: String,
    pub memory: String,
    pub list_only: bool,
    pub big: bool,
    pub separate: bool,
    pub only_metadata: bool,
    pub keep_going: bool,
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            folder: PathBuf::from(DEFAULT_FOLDER),
            keyword: DEFAULT_KEYWORD.to_string(),
            memory: DEFAULT_MEMORY.to_string(),
            list_only: false,
            big: false,
            separate: false,
            only_metadata: false,
            keep_going: false,
            verbose: false,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text, keeping defaults for absent keys
    pub fn from_toml_str(content: &str) -> ConvertResult<Self> {
        let value: toml::Table = content.parse()
            .map_err(|e| ConvertError::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut settings = Settings::default();
        if let Some(section) = value.get(CONFIG_TABLE) {
            let table = section.as_table().ok_or_else(|| ConvertError::Config(
                format!("[{}] must be a table", CONFIG_TABLE)))?;
            settings.apply_table(table)?;
        }
        Ok(settings)
    }

    /// Read settings from a TOML file
    pub fn load(path: &Path) -> ConvertResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConvertError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Settings from parsed command-line arguments
    pub fn from_matches(matches: &ArgMatches) -> ConvertResult<Self> {
        let mut settings = match matches.get_one::<String>("config") {
            Some(path) => Self::load(Path::new(path))?,
            None => Settings::default(),
        };

        if let Some(folder) = matches.get_one::<String>("folder") {
            settings.folder = PathBuf::from(folder);
        }
        if let Some(keyword) = matches.get_one::<String>("keyword") {
            settings.keyword = keyword.clone();
        }
        if let Some(memory) = matches.get_one::<String>("memory") {
            settings.memory = memory.clone();
        }
        settings.list_only |= matches.get_flag("list");
        settings.big |= matches.get_flag("big");
        settings.separate |= matches.get_flag("separate");
        settings.only_metadata |= matches.get_flag("onlymetadata");
        settings.keep_going |= matches.get_flag("keep-going");
        settings.verbose |= matches.get_flag("verbose");

        Ok(settings)
    }

    fn apply_table(&mut self, table: &toml::Table) -> ConvertResult<()> {
        for (key, value) in table {
            match key.as_str() {
                "folder" => self.folder = PathBuf::from(string_value(key, value)?),
                "keyword" => self.keyword = string_value(key, value)?,
                "memory" => self.memory = string_value(key, value)?,
                "big" => self.big = bool_value(key, value)?,
                "separate" => self.separate = bool_value(key, value)?,
                "only_metadata" => self.only_metadata = bool_value(key, value)?,
                "keep_going" => self.keep_going = bool_value(key, value)?,
                other => warn!("Ignoring unknown setting '{}'", other),
            }
        }
        Ok(())
    }

    /// Per-file conversion options
    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            big_format: self.big,
            split_planes: self.separate,
            mode: if self.only_metadata { ConversionMode::MetadataOnly } else { ConversionMode::Images },
            policy: if self.keep_going { FailurePolicy::SkipAndReport } else { FailurePolicy::FailFast },
        }
    }

    /// Decoder session settings
    pub fn session_config(&self) -> ConvertResult<SessionConfig> {
        SessionConfig::with_memory(&self.memory).map_err(|e| ConvertError::Config(e.to_string()))
    }
}

fn string_value(key: &str, value: &toml::Value) -> ConvertResult<String> {
    value.as_str()
        .map(str::to_string)
        .ok_or_else(|| ConvertError::Config(format!("'{}' must be a string", key)))
}

fn bool_value(key: &str, value: &toml::Value) -> ConvertResult<bool> {
    value.as_bool()
        .ok_or_else(|| ConvertError::Config(format!("'{}' must be true or false", key)))
}
