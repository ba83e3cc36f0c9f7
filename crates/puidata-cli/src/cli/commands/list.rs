//! `puidata list` – list cached files of one format.

use anyhow::Result;
use puidata_core::cache::list_cache;
use puidata_core::FormatKind;
use std::path::Path;

pub fn run_list(cache_root: &Path, format: FormatKind, full_path: bool) -> Result<()> {
    // Extracted shapefile archives live one folder down.
    let include_subdirs = format == FormatKind::Shapefile;
    let files = list_cache(cache_root, format.extension(), include_subdirs, full_path)?;
    if files.is_empty() {
        println!(
            "No cached {} files in {}.",
            format.extension(),
            cache_root.display()
        );
    } else {
        for f in files {
            println!("{}", f.display());
        }
    }
    Ok(())
}
