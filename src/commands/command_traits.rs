//! Command pattern interfaces

use crate::api::Microscoper;
use crate::config::Settings;
use crate::pipeline::errors::ConvertResult;

/// An executable CLI operation
pub trait Command {
    fn execute(&self) -> ConvertResult<()>;
}

/// Builds the command a run's settings ask for
pub trait CommandFactory<'a> {
    fn create_command(&self, settings: &Settings, api: &'a Microscoper) -> ConvertResult<Box<dyn Command + 'a>>;
}
