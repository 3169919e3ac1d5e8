//! Decoder session lifecycle
//!
//! A session wraps one backend for a whole batch. It is started once
//! before the first file and stopped once after the last, on every exit
//! path: `shutdown` stops it explicitly and `Drop` covers early returns.

use log::{debug, info};
use std::path::Path;

use crate::decoder::errors::{DecodeError, DecodeResult};
use crate::decoder::{Container, ContainerDecoder};
use crate::metadata::MetadataDocument;

/// Default heap limit handed to the backend
pub const DEFAULT_MEMORY: &str = "2G";

/// Backend settings fixed for the lifetime of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Largest number of bytes the backend may hold for one plane
    pub max_heap_bytes: u64,
}

impl SessionConfig {
    /// Build a configuration from a size such as `2G`, `512M` or `1024K`
    pub fn with_memory(size: &str) -> DecodeResult<Self> {
        Ok(SessionConfig {
            max_heap_bytes: parse_memory_size(size)?,
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_heap_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}

/// Parse a memory size with an optional `K`, `M` or `G` suffix
pub fn parse_memory_size(size: &str) -> DecodeResult<u64> {
    let trimmed = size.trim();
    let (digits, multiplier) = match trimmed.chars().last().map(|c| c.to_ascii_uppercase()) {
        Some('K') => (&trimmed[..trimmed.len() - 1], 1024u64),
        Some('M') => (&trimmed[..trimmed.len() - 1], 1024 * 1024),
        Some('G') => (&trimmed[..trimmed.len() - 1], 1024 * 1024 * 1024),
        _ => (trimmed, 1),
    };

    let value: u64 = digits.parse()
        .map_err(|_| DecodeError::Config(format!("invalid memory size '{}'", size)))?;
    if value == 0 {
        return Err(DecodeError::Config(format!("memory size '{}' must be positive", size)));
    }
    value.checked_mul(multiplier)
        .ok_or_else(|| DecodeError::Config(format!("memory size '{}' is too large", size)))
}

/// A started decoder backend
pub struct DecoderSession {
    backend: Box<dyn ContainerDecoder>,
    config: SessionConfig,
    running: bool,
}

impl DecoderSession {
    /// Start `backend` with `config`
    pub fn start(mut backend: Box<dyn ContainerDecoder>, config: SessionConfig) -> DecodeResult<Self> {
        backend.start(&config)?;
        info!("Started {} decoder session (heap limit {} bytes)", backend.name(), config.max_heap_bytes);
        Ok(DecoderSession {
            backend,
            config,
            running: true,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Whether the backend recognises `path`
    pub fn can_open(&self, path: &Path) -> bool {
        self.backend.can_open(path)
    }

    /// Open `path` for plane reads
    pub fn open_container(&self, path: &Path) -> DecodeResult<Box<dyn Container>> {
        debug!("Opening {} with {}", path.display(), self.backend.name());
        self.backend.open(path, &self.config)
    }

    /// Extract the metadata document of `path`
    pub fn extract_metadata(&self, path: &Path) -> DecodeResult<MetadataDocument> {
        self.backend.metadata(path)
    }

    /// Stop the backend
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.backend.shutdown();
            info!("Stopped {} decoder session", self.backend.name());
        }
    }
}

impl Drop for DecoderSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingBackend {
        starts: Rc<Cell<usize>>,
        stops: Rc<Cell<usize>>,
    }

    impl ContainerDecoder for CountingBackend {
        fn name(&self) -> &str {
            "counting"
        }

        fn can_open(&self, _path: &Path) -> bool {
            true
        }

        fn open(&self, path: &Path, _config: &SessionConfig) -> DecodeResult<Box<dyn Container>> {
            Err(DecodeError::UnsupportedContainer(path.display().to_string()))
        }

        fn metadata(&self, path: &Path) -> DecodeResult<MetadataDocument> {
            Err(DecodeError::MissingMetadata(path.display().to_string()))
        }

        fn start(&mut self, _config: &SessionConfig) -> DecodeResult<()> {
            self.starts.set(self.starts.get() + 1);
            Ok(())
        }

        fn shutdown(&mut self) {
            self.stops.set(self.stops.get() + 1);
        }
    }

    fn counting() -> (Box<CountingBackend>, Rc<Cell<usize>>, Rc<Cell<usize>>) {
        let starts = Rc::new(Cell::new(0));
        let stops = Rc::new(Cell::new(0));
        let backend = Box::new(CountingBackend { starts: starts.clone(), stops: stops.clone() });
        (backend, starts, stops)
    }

    #[test]
    fn test_parse_memory_size() {
        assert_eq!(parse_memory_size("2G").unwrap(), 2 * 1024 * 1024 * 1024);
        assert_eq!(parse_memory_size("512m").unwrap(), 512 * 1024 * 1024);
        assert_eq!(parse_memory_size("1024K").unwrap(), 1024 * 1024);
        assert_eq!(parse_memory_size("4096").unwrap(), 4096);
        assert!(parse_memory_size("lots").is_err());
        assert!(parse_memory_size("0G").is_err());
        assert!(parse_memory_size("").is_err());
    }

    #[test]
    fn test_shutdown_runs_once() {
        let (backend, starts, stops) = counting();
        let session = DecoderSession::start(backend, SessionConfig::default()).unwrap();
        assert_eq!(starts.get(), 1);
        session.shutdown();
        assert_eq!(stops.get(), 1);
    }

    #[test]
    fn test_drop_stops_session() {
        let (backend, _starts, stops) = counting();
        {
            let _session = DecoderSession::start(backend, SessionConfig::default()).unwrap();
        }
        assert_eq!(stops.get(), 1);
    }
}
