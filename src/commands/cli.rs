//! Command-line definition

use clap::{Arg, ArgAction, Command as ClapCommand};

use crate::config::{DEFAULT_FOLDER, DEFAULT_KEYWORD, DEFAULT_MEMORY};

/// Build the `microscoper` argument parser
///
/// Options carry no clap defaults so that unset flags leave config file
/// values in place.
pub fn cli() -> ClapCommand {
    ClapCommand::new("microscoper")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert microscopy containers into per-channel TIFF stacks")
        .arg(
            Arg::new("folder")
                .short('f')
                .long("folder")
                .help(format!("Folder searched recursively for input files [default: {}]", DEFAULT_FOLDER))
                .value_name("DIR")
                .required(false),
        )
        .arg(
            Arg::new("keyword")
                .short('k')
                .long("keyword")
                .help(format!("Only files whose path contains this text [default: {}]", DEFAULT_KEYWORD))
                .value_name("TEXT")
                .required(false),
        )
        .arg(
            Arg::new("memory")
                .short('m')
                .long("memory")
                .help(format!("Decoder heap limit such as 2G, 512M or 1024K [default: {}]", DEFAULT_MEMORY))
                .value_name("SIZE")
                .required(false),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help("List the matching files and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("separate")
                .short('s')
                .long("separate")
                .help("Write one TIFF file per plane instead of one stack per channel")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("big")
                .short('b')
                .long("big")
                .help("Write BigTIFF files, needed for stacks over 4 GiB")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("onlymetadata")
                .long("onlymetadata")
                .visible_alias("om")
                .help("Only write metadata.xml for each file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("keep-going")
                .long("keep-going")
                .help("Continue with the remaining files when one fails")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML file with a [microscoper] table of defaults")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
}
