//! Cache directory listing.

use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};

/// Lists cache entries ending in `extension` (e.g. `.csv`).
///
/// With `include_subdirs`, entries one level down are listed instead of the
/// root's own files; extracted shapefile archives live in per-archive folders.
/// Paths are relative to `root` unless `full_path` is set. Sorted by path.
/// A missing root lists nothing.
pub fn list_cache(
    root: &Path,
    extension: &str,
    include_subdirs: bool,
    full_path: bool,
) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "cache root does not exist");
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    if include_subdirs {
        for dir in read_dir(root)? {
            if dir.is_dir() {
                found.extend(read_dir(&dir)?.into_iter().filter(|p| matches(p, extension)));
            }
        }
    } else {
        found.extend(read_dir(root)?.into_iter().filter(|p| matches(p, extension)));
    }
    found.sort();
    if !full_path {
        found = found
            .into_iter()
            .map(|p| p.strip_prefix(root).map(Path::to_path_buf).unwrap_or(p))
            .collect();
    }
    Ok(found)
}

fn read_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| PipelineError::io(format!("list {}", dir.display()), e))?;
    entries
        .map(|entry| {
            entry
                .map(|e| e.path())
                .map_err(|e| PipelineError::io(format!("list {}", dir.display()), e))
        })
        .collect()
}

fn matches(path: &Path, extension: &str) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(extension))
}
