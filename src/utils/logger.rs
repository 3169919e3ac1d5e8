//! Logger utility for application-wide logging
//!
//! A file-backed logger that also serves as the global `log` backend,
//! echoing every record to the console.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use log::{Log, Record, Level, Metadata};

/// File-backed logger
pub struct Logger {
    /// File handle for log output, `None` for a logger that discards lines
    file: Mutex<Option<File>>,
    /// Most verbose level accepted when acting as the global logger
    level: Level,
}

impl Logger {
    /// Creates a logger writing to `log_file`, truncating it
    pub fn new(log_file: &str) -> io::Result<Self> {
        let file = File::create(Path::new(log_file))?;
        Ok(Logger {
            file: Mutex::new(Some(file)),
            level: Level::Info,
        })
    }

    /// Creates a logger that accepts lines and writes them nowhere
    pub fn null() -> Self {
        Logger {
            file: Mutex::new(None),
            level: Level::Info,
        }
    }

    /// Appends one line to the log file
    pub fn log(&self, message: &str) -> io::Result<()> {
        let mut guard = self.file.lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        if let Some(file) = guard.as_mut() {
            writeln!(file, "{}", message)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Installs a logger writing to `log_file` as the global `log` backend
    ///
    /// `verbose` lowers the threshold from Info to Debug.
    pub fn init_global_logger(log_file: &str, verbose: bool) -> io::Result<()> {
        let mut global_logger = Logger::new(log_file)?;
        global_logger.level = if verbose { Level::Debug } else { Level::Info };
        let filter = global_logger.level.to_level_filter();

        if log::set_boxed_logger(Box::new(global_logger)).is_err() {
            eprintln!("Warning: Global logger was already initialized");
        }

        log::set_max_level(filter);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}", record.level(), record.args());
            let _ = Logger::log(self, &message);

            if record.level() <= Level::Warn {
                eprintln!("{}", message);
            } else {
                println!("{}", message);
            }
        }
    }

    fn flush(&self) {}
}
