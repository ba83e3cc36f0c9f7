//! Last-segment extraction from URLs and local paths.

use crate::source::Location;
use std::path::Path;

/// Extracts the last path segment of a source for use as a filename hint.
///
/// Remote URLs use the parsed path, so query and fragment never leak into the
/// name. Anything else is treated as a filesystem path.
pub fn filename_from_source(source: &str) -> Option<String> {
    let segment = match Location::classify(source) {
        Location::Remote(url) => url
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .last()
            .map(str::to_string)?,
        Location::Local(path) => path.file_name()?.to_str()?.to_string(),
    };
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    Some(segment)
}

/// File name without its extension (`mn_mappluto_16v2.zip` → `mn_mappluto_16v2`).
pub fn file_stem(source: &str) -> Option<String> {
    let name = filename_from_source(source)?;
    let stem = Path::new(&name).file_stem()?.to_str()?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}
