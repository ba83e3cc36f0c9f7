//! Source classification: remote URL or local path.
//!
//! Only a string that is *not* a network URL falls back to the filesystem.
//! A network URL that then fails to download is a fetch error, never a
//! silent local lookup.

use crate::error::{FetchError, Result};
use crate::transport::Transport;
use std::path::PathBuf;
use url::Url;

/// URL schemes fetched over the network.
const NETWORK_SCHEMES: &[&str] = &["http", "https", "ftp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Remote(Url),
    Local(PathBuf),
}

impl Location {
    /// Classifies `source`. `file://` URLs map to their path; strings that
    /// fail to parse, or parse with a non-network scheme (`C:\data.csv`
    /// parses with scheme `c`), are local paths.
    pub fn classify(source: &str) -> Location {
        match Url::parse(source) {
            Ok(url) if NETWORK_SCHEMES.contains(&url.scheme()) => Location::Remote(url),
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => Location::Local(path),
                Err(()) => Location::Local(PathBuf::from(source)),
            },
            _ => Location::Local(PathBuf::from(source)),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Remote(_))
    }
}

/// URL-encodes `query` onto `url`, keeping any parameters already present.
pub fn with_query(mut url: Url, query: &[(String, String)]) -> Url {
    if !query.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    url
}

/// Reads the whole payload of `location`: one GET through `transport` for
/// remote sources, a file read for local ones. The query only applies to
/// remote sources.
pub fn read_location<T: Transport + ?Sized>(
    location: &Location,
    query: &[(String, String)],
    transport: &T,
) -> Result<Vec<u8>> {
    match location {
        Location::Remote(url) => {
            let url = with_query(url.clone(), query);
            tracing::info!(url = %url, "fetching remote source");
            Ok(transport.get(&url)?)
        }
        Location::Local(path) => {
            tracing::info!(path = %path.display(), "reading local source");
            std::fs::read(path).map_err(|source| {
                FetchError::Local {
                    path: path.clone(),
                    source,
                }
                .into()
            })
        }
    }
}
