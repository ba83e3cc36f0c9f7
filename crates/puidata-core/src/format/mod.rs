//! Format capabilities: how bytes become tables and tables become cache files.
//!
//! The format is chosen by the caller, never sniffed from content.

mod csv;
mod excel;
mod shapefile;

pub use self::csv::CsvFormat;
pub use self::excel::ExcelFormat;
pub use self::shapefile::ShapefileFormat;

use crate::error::{PipelineError, Result};
use crate::table::TabularResult;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How the pipeline hands a fetched payload to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Parse the selected bytes directly.
    Stream,
    /// Write the payload (the whole archive, if archived) under the cache
    /// directory first, then parse from the resulting path.
    ExtractedDirectory,
}

pub trait TableFormat {
    /// Short label used in errors and logs.
    fn name(&self) -> &'static str;

    /// Extension appended to derived filenames that have none, and used to
    /// list cache entries (e.g. `.csv`).
    fn extension(&self) -> &str;

    fn input_mode(&self) -> InputMode {
        InputMode::Stream
    }

    /// Cache subdirectory for a source with no explicit one.
    fn default_subdir(&self, _source: &str) -> Option<String> {
        None
    }

    fn parse(&self, bytes: &[u8]) -> Result<TabularResult>;

    fn parse_path(&self, path: &Path) -> Result<TabularResult> {
        let bytes = std::fs::read(path)
            .map_err(|e| PipelineError::io(format!("read {}", path.display()), e))?;
        self.parse(&bytes)
    }

    /// Reads a cache entry written by `serialize`. Formats whose fetch-time
    /// options do not apply to their own cache files override this.
    fn parse_cached(&self, path: &Path) -> Result<TabularResult> {
        self.parse_path(path)
    }

    /// Cache file contents, or `None` when this format is not persisted.
    fn serialize(&self, result: &TabularResult) -> Result<Option<Vec<u8>>>;
}

impl<F: TableFormat + ?Sized> TableFormat for Box<F> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn extension(&self) -> &str {
        (**self).extension()
    }

    fn input_mode(&self) -> InputMode {
        (**self).input_mode()
    }

    fn default_subdir(&self, source: &str) -> Option<String> {
        (**self).default_subdir(source)
    }

    fn parse(&self, bytes: &[u8]) -> Result<TabularResult> {
        (**self).parse(bytes)
    }

    fn parse_path(&self, path: &Path) -> Result<TabularResult> {
        (**self).parse_path(path)
    }

    fn parse_cached(&self, path: &Path) -> Result<TabularResult> {
        (**self).parse_cached(path)
    }

    fn serialize(&self, result: &TabularResult) -> Result<Option<Vec<u8>>> {
        (**self).serialize(result)
    }
}

/// Explicit format tag for callers that pick a format at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Csv,
    Excel,
    Shapefile,
}

impl FormatKind {
    pub const ALL: [FormatKind; 3] = [FormatKind::Csv, FormatKind::Excel, FormatKind::Shapefile];

    pub fn extension(self) -> &'static str {
        match self {
            FormatKind::Csv => ".csv",
            FormatKind::Excel => ".xlsx",
            FormatKind::Shapefile => ".shp",
        }
    }

    /// Format with default options.
    pub fn default_format(self) -> Box<dyn TableFormat> {
        match self {
            FormatKind::Csv => Box::new(CsvFormat::default()),
            FormatKind::Excel => Box::new(ExcelFormat::default()),
            FormatKind::Shapefile => Box::new(ShapefileFormat),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormatKind::Csv => "csv",
            FormatKind::Excel => "xlsx",
            FormatKind::Shapefile => "shp",
        };
        f.write_str(s)
    }
}

impl FromStr for FormatKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" => Ok(FormatKind::Csv),
            "xlsx" | "xls" | "excel" => Ok(FormatKind::Excel),
            "shp" | "shapefile" => Ok(FormatKind::Shapefile),
            other => Err(format!(
                "unknown format {:?} (expected csv, xlsx or shp)",
                other
            )),
        }
    }
}
