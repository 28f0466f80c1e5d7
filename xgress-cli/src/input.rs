//! Input discovery and reading.
//!
//! A path is either a single YAML file or a directory, in which case every
//! `*.yaml` / `*.yml` file below it is read, sorted by path so runs are
//! reproducible.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use xgress_core::{Result, XgressError};

const YAML_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// List the YAML sources behind `path`.
pub fn discover(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| XgressError::Unreadable {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| path.to_path_buf()),
            source: e.into(),
        })?;
        if entry.file_type().is_file() && is_yaml(entry.path()) {
            files.push(entry.into_path());
        }
    }
    tracing::debug!(dir = %path.display(), files = files.len(), "Discovered policy files");
    Ok(files)
}

/// Read one source in full.
pub fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| XgressError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| YAML_EXTENSIONS.iter().any(|y| ext.eq_ignore_ascii_case(y)))
}
