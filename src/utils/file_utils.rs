//! Input discovery
//!
//! Walks an input folder and collects every file whose path contains a
//! keyword, sorted so batches always run in the same order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use log::{debug, warn};

/// Recursively collect files under `directory` whose path contains `keyword`
///
/// Symbolic links to directories are not followed.
/// Subdirectories that cannot be read are skipped with a warning; only a
/// failure to read `directory` itself is an error.
pub fn find_files(directory: &Path, keyword: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![directory.to_path_buf()];
    let mut is_root = true;

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if is_root => return Err(e),
            Err(e) => {
                warn!("Skipping unreadable directory {}: {}", dir.display(), e);
                continue;
            }
        };
        is_root = false;

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            // Links to directories are listed but never descended into
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_symlink() && path.is_dir() {
                debug!("Not following directory link {}", path.display());
            } else if path.to_string_lossy().contains(keyword) {
                debug!("Matched {}", path.display());
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
