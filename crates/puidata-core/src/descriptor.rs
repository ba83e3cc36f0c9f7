//! Resource descriptors: what to fetch and where its cache entry lives.

use crate::config::CacheSettings;
use crate::error::{PipelineError, Result};
use crate::url_model::derive_filename;
use std::path::{Path, PathBuf};

/// Identifies one fetchable resource and its cache entry.
///
/// The cache root is fixed at construction. The filename may be left out;
/// it is then derived from the URL the first time it is needed and does not
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    url: Option<String>,
    filename: Option<String>,
    subdir: Option<String>,
    archive_member_index: Option<usize>,
    is_archived: bool,
    cache_root: PathBuf,
}

impl Descriptor {
    /// New descriptor whose cache root is read from the environment now.
    pub fn new(settings: &CacheSettings) -> Self {
        Self::in_cache(settings.resolve_root())
    }

    /// New descriptor with an explicit cache root.
    pub fn in_cache(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            url: None,
            filename: None,
            subdir: None,
            archive_member_index: None,
            is_archived: false,
            cache_root: cache_root.into(),
        }
    }

    /// Remote URL or local path to read from.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Cache filename, also used to pick a member out of an archive.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Folder under the cache root for this entry.
    pub fn with_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.subdir = Some(subdir.into());
        self
    }

    pub fn archived(mut self, is_archived: bool) -> Self {
        self.is_archived = is_archived;
        self
    }

    /// Member to use when the filename does not name one in the archive.
    pub fn with_member_index(mut self, index: usize) -> Self {
        self.archive_member_index = Some(index);
        self
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn subdir(&self) -> Option<&str> {
        self.subdir.as_deref()
    }

    pub fn is_archived(&self) -> bool {
        self.is_archived
    }

    pub fn archive_member_index(&self) -> usize {
        self.archive_member_index.unwrap_or(0)
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Returns the filename, deriving it from the URL if unset.
    ///
    /// `default_extension` is appended to derived names with no extension.
    pub fn resolve_filename(&mut self, default_extension: &str) -> Result<&str> {
        if self.filename.is_none() {
            let url = self.url.as_deref().ok_or(PipelineError::InvalidDescriptor)?;
            let derived =
                derive_filename(url, default_extension).ok_or(PipelineError::InvalidDescriptor)?;
            tracing::debug!(url, filename = %derived, "derived cache filename");
            self.filename = Some(derived);
        }
        Ok(self.filename.as_deref().unwrap_or_default())
    }

    /// Sets the subdir from `default` unless one is already set.
    pub(crate) fn default_subdir(&mut self, default: Option<String>) {
        if self.subdir.is_none() {
            self.subdir = default;
        }
    }

    /// Adopts an archive member's name; only fills an unset filename.
    pub(crate) fn adopt_filename(&mut self, name: &str) {
        if self.filename.is_none() {
            tracing::debug!(filename = name, "adopted archive member name as cache filename");
            self.filename = Some(name.to_string());
        }
    }

    /// Points the filename at an extracted member (path relative to the
    /// cache dir). Replaces an explicit filename that only matched the
    /// member's base name or fell back to its index.
    pub(crate) fn record_member_path(&mut self, member: &str) {
        if self.filename.as_deref() != Some(member) {
            tracing::debug!(previous = ?self.filename, member, "recorded extracted member as cache filename");
            self.filename = Some(member.to_string());
        }
    }

    /// Directory holding this entry: `<cache_root>[/<subdir>]`.
    pub fn cache_dir(&self) -> PathBuf {
        match &self.subdir {
            Some(subdir) => self.cache_root.join(subdir),
            None => self.cache_root.clone(),
        }
    }

    /// Full cache path, resolving the filename if needed.
    pub fn local_path(&mut self, default_extension: &str) -> Result<PathBuf> {
        let filename = self.resolve_filename(default_extension)?.to_string();
        Ok(self.cache_dir().join(filename))
    }
}
