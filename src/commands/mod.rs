//! CLI command implementations
//!
//! Each CLI mode is a `Command`, chosen by the factory from the run's
//! settings.

pub mod cli;
pub mod command_traits;
pub mod list_command;
pub mod convert_command;

pub use cli::cli;
pub use command_traits::{Command, CommandFactory};
pub use list_command::ListCommand;
pub use convert_command::ConvertCommand;

use crate::api::Microscoper;
use crate::config::Settings;
use crate::pipeline::errors::ConvertResult;

/// Creates the list or convert command
#[derive(Debug, Default)]
pub struct MicroscoperCommandFactory;

impl MicroscoperCommandFactory {
    pub fn new() -> Self {
        MicroscoperCommandFactory
    }
}

impl<'a> CommandFactory<'a> for MicroscoperCommandFactory {
    fn create_command(&self, settings: &Settings, api: &'a Microscoper) -> ConvertResult<Box<dyn Command + 'a>> {
        if settings.list_only {
            Ok(Box::new(ListCommand::new(settings, api)))
        } else {
            Ok(Box::new(ConvertCommand::new(settings, api)?))
        }
    }
}

pub(crate) fn print_no_match(keyword: &str) {
    println!("No file matching *{}* keyword.", keyword);
}
