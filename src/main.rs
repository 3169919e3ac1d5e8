use std::process;
use log::error;

use microscoper::commands::{cli, CommandFactory, MicroscoperCommandFactory};
use microscoper::config::Settings;
use microscoper::utils::logger::Logger;
use microscoper::Microscoper;

fn main() {
    let matches = cli().get_matches();

    let settings = match Settings::from_matches(&matches) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let api = match Microscoper::new(Some("microscoper.log")) {
        Ok(api) => api.with_progress(true),
        Err(e) => {
            eprintln!("Error initializing logger: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = Logger::init_global_logger("microscoper-global.log", settings.verbose) {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(1);
    }

    let factory = MicroscoperCommandFactory::new();

    let command_result = factory.create_command(&settings, &api);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
