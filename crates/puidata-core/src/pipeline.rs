//! Cached-fetch pipeline: check cache, fetch, parse, save.
//!
//! Each stage takes a [`Loaded`] by value and returns it, so callers can run
//! the stages one at a time or compose them with [`Pipeline::fetch`]. A stage
//! that finds a result already present leaves it alone.

use crate::archive::Archive;
use crate::descriptor::Descriptor;
use crate::error::{PipelineError, Result};
use crate::format::{InputMode, TableFormat};
use crate::source::{read_location, Location};
use crate::table::{SheetSelector, TabularResult};
use crate::transport::{CurlTransport, Transport};
use std::path::{Path, PathBuf};

/// Per-call fetch options.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Query parameters URL-encoded onto a remote URL.
    pub query: Vec<(String, String)>,
    /// Skip the cache read and overwrite the cache entry.
    pub refresh: bool,
    /// Do not write the cache entry.
    pub skip_save: bool,
}

impl FetchOptions {
    pub fn with_query<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }
}

/// A descriptor plus whatever result the stages so far produced.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub descriptor: Descriptor,
    pub result: Option<TabularResult>,
}

impl Loaded {
    pub fn new(descriptor: Descriptor) -> Self {
        Self {
            descriptor,
            result: None,
        }
    }

    /// True iff a result with at least one row is attached.
    pub fn is_present(&self) -> bool {
        self.result.as_ref().is_some_and(TabularResult::is_present)
    }

    /// Collapses a multi-sheet result to the sheet `selector` names, falling
    /// back to sheet `fallback` when no sheet has that name.
    pub fn select_sheet(mut self, selector: &SheetSelector, fallback: Option<usize>) -> Result<Self> {
        let Some(result) = self.result.take() else {
            return Ok(self);
        };
        match result.into_sheet(selector, fallback) {
            Ok(table) => {
                self.result = Some(table);
                Ok(self)
            }
            Err(sheets) => Err(PipelineError::parse(
                "xlsx",
                format!("{} not found (have: {})", selector, sheets.sheet_names().join(", ")),
            )),
        }
    }
}

/// Runs the cached-fetch stages for one format over one transport.
#[derive(Debug, Clone)]
pub struct Pipeline<F, T = CurlTransport> {
    format: F,
    transport: T,
}

impl<F: TableFormat> Pipeline<F> {
    pub fn new(format: F) -> Self {
        Self::with_transport(format, CurlTransport::default())
    }
}

impl<F: TableFormat, T: Transport> Pipeline<F, T> {
    pub fn with_transport(format: F, transport: T) -> Self {
        Self { format, transport }
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    /// Full pipeline: cache read (unless refreshing), fetch, cache write
    /// (unless `skip_save`).
    pub fn fetch(&self, descriptor: Descriptor, options: &FetchOptions) -> Result<Loaded> {
        let loaded = Loaded::new(descriptor);
        let loaded = if options.refresh {
            loaded
        } else {
            self.load_from_cache(loaded)?
        };
        let loaded = self.fetch_remote(loaded, options)?;
        if options.skip_save {
            return Ok(loaded);
        }
        self.save_to_cache(loaded, options.refresh)
    }

    /// `fetch` with default options: read the cache if it exists, otherwise
    /// download, parse and cache.
    ///
    /// An archived descriptor without a filename cannot be looked up in the
    /// cache until a member is picked, so every call with it downloads again.
    /// Reuse `Loaded::descriptor` from the first call: it carries the chosen
    /// member's name and hits the cache from then on.
    pub fn cached_load(&self, descriptor: Descriptor) -> Result<Loaded> {
        self.fetch(descriptor, &FetchOptions::default())
    }

    /// Attaches the parsed cache entry if one exists. A missing entry is not
    /// an error.
    pub fn load_from_cache(&self, mut loaded: Loaded) -> Result<Loaded> {
        self.apply_default_subdir(&mut loaded.descriptor);
        let Some(path) = self.cache_path(&mut loaded.descriptor)? else {
            tracing::debug!("archive member not chosen yet, skipping cache lookup");
            return Ok(loaded);
        };
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no cache entry");
            return Ok(loaded);
        }
        let result = self.format.parse_cached(&path)?;
        tracing::info!(path = %path.display(), "loaded from cache");
        loaded.result = Some(result);
        Ok(loaded)
    }

    /// Downloads (or reads) the source and parses it, unless a result is
    /// already present.
    pub fn fetch_remote(&self, mut loaded: Loaded, options: &FetchOptions) -> Result<Loaded> {
        if loaded.is_present() {
            return Ok(loaded);
        }
        self.apply_default_subdir(&mut loaded.descriptor);
        let descriptor = &mut loaded.descriptor;
        let location = match descriptor.url() {
            Some(url) => Location::classify(url),
            None => Location::Local(descriptor.local_path(self.format.extension())?),
        };

        let result = match self.format.input_mode() {
            InputMode::Stream => {
                let bytes = read_location(&location, &options.query, &self.transport)?;
                if descriptor.is_archived() {
                    let mut archive = Archive::new(&bytes)?;
                    let member =
                        archive.select(descriptor.filename(), descriptor.archive_member_index())?;
                    tracing::debug!(member = %member.name, "selected archive member");
                    descriptor.adopt_filename(&member.base_name);
                    self.format.parse(&member.bytes)?
                } else {
                    self.format.parse(&bytes)?
                }
            }
            InputMode::ExtractedDirectory => {
                let path = self.extract(descriptor, &location, options)?;
                self.format.parse_path(&path)?
            }
        };

        tracing::info!(
            format = self.format.name(),
            rows = result.primary().map(|t| t.row_count()).unwrap_or(0),
            "parsed source"
        );
        loaded.result = Some(result);
        Ok(loaded)
    }

    pub fn parse(&self, bytes: &[u8]) -> Result<TabularResult> {
        self.format.parse(bytes)
    }

    /// Writes the result to the cache entry. Does nothing when no result is
    /// present, when the format does not persist, or when the entry exists
    /// and `overwrite` is false.
    pub fn save_to_cache(&self, mut loaded: Loaded, overwrite: bool) -> Result<Loaded> {
        if !loaded.is_present() {
            tracing::debug!("no rows, not caching");
            return Ok(loaded);
        }
        let path = loaded.descriptor.local_path(self.format.extension())?;
        if path.is_file() && !overwrite {
            return Ok(loaded);
        }
        let Some(result) = loaded.result.as_ref() else {
            return Ok(loaded);
        };
        let Some(bytes) = self.format.serialize(result)? else {
            return Ok(loaded);
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PipelineError::io(format!("create dir {}", parent.display()), e))?;
        }
        tracing::info!(path = %path.display(), bytes = bytes.len(), "saving to cache");
        std::fs::write(&path, &bytes)
            .map_err(|e| PipelineError::io(format!("write {}", path.display()), e))?;
        Ok(loaded)
    }

    fn apply_default_subdir(&self, descriptor: &mut Descriptor) {
        if let Some(url) = descriptor.url() {
            let subdir = self.format.default_subdir(url);
            descriptor.default_subdir(subdir);
        }
    }

    /// Cache path for the descriptor, or `None` while an archived source
    /// has no filename: it is only known once a member is picked.
    fn cache_path(&self, descriptor: &mut Descriptor) -> Result<Option<PathBuf>> {
        if descriptor.is_archived() && descriptor.filename().is_none() {
            return Ok(None);
        }
        descriptor.local_path(self.format.extension()).map(Some)
    }

    /// Places the source under the cache directory and returns the path to
    /// parse. Archives are extracted whole; plain remote files are written as
    /// the cache entry; plain local files are parsed where they are.
    fn extract(
        &self,
        descriptor: &mut Descriptor,
        location: &Location,
        options: &FetchOptions,
    ) -> Result<PathBuf> {
        let extension = self.format.extension();
        if descriptor.is_archived() {
            let bytes = read_location(location, &options.query, &self.transport)?;
            let mut archive = Archive::new(&bytes)?;
            let pos = archive.resolve(
                descriptor.filename(),
                descriptor.archive_member_index(),
                |name| has_extension(name, extension),
            )?;
            let member = archive.name_at(pos).to_string();
            let dir = descriptor.cache_dir();
            tracing::info!(dir = %dir.display(), member = %member, "extracting archive");
            archive.extract_all(&dir)?;
            descriptor.record_member_path(&member);
            return Ok(dir.join(member));
        }
        match location {
            Location::Local(path) => Ok(path.clone()),
            Location::Remote(_) => {
                let bytes = read_location(location, &options.query, &self.transport)?;
                let path = descriptor.local_path(extension)?;
                write_file(&path, &bytes)?;
                Ok(path)
            }
        }
    }
}

fn has_extension(name: &str, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| PipelineError::io(format!("create dir {}", parent.display()), e))?;
    }
    std::fs::write(path, bytes).map_err(|e| PipelineError::io(format!("write {}", path.display()), e))
}
