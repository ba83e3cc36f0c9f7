//! Cache filename derivation.
//!
//! A descriptor without an explicit filename is cached under the last path
//! segment of its source: the URL path (query and fragment dropped) for remote
//! sources, the file name for local paths.

mod path;
mod sanitize;

pub use path::{file_stem, filename_from_source};
pub use sanitize::sanitize_filename;

/// Derives the cache filename for `source`.
///
/// When the last segment has no extension, `default_extension` (e.g. `.csv`)
/// is appended so the cache entry is recognisable by `list_cache`. Returns
/// `None` when the source has no usable segment (`https://example.com/`).
///
/// # Examples
///
/// - `derive_filename("https://example.com/data/pop.csv?x=1", ".csv")` → `"pop.csv"`
/// - `derive_filename("https://example.com/indicator/SP.POP", ".csv")` → `"SP.POP"`
/// - `derive_filename("https://example.com/download", ".xlsx")` → `"download.xlsx"`
pub fn derive_filename(source: &str, default_extension: &str) -> Option<String> {
    let raw = filename_from_source(source)?;
    let sanitized = sanitize_filename(&raw);
    if sanitized.is_empty() {
        return None;
    }
    if sanitized.contains('.') || default_extension.is_empty() {
        Some(sanitized)
    } else {
        Some(format!("{}{}", sanitized, default_extension))
    }
}
