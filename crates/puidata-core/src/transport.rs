//! Single-request HTTP GET into memory.
//!
//! The whole body is buffered because every consumer needs random access
//! (zip central directory, workbook parsing) or reads it once anyway.

use crate::config::HttpSettings;
use crate::error::FetchError;
use url::Url;

/// Issues exactly one GET per call. No retry or backoff.
pub trait Transport {
    fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        (**self).get(url)
    }
}

/// libcurl-backed transport. Blocks the calling thread.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    user_agent: Option<String>,
    max_redirections: u32,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::from_settings(&HttpSettings::default())
    }
}

impl CurlTransport {
    pub fn from_settings(settings: &HttpSettings) -> Self {
        Self {
            user_agent: settings.user_agent.clone(),
            max_redirections: settings.max_redirections,
        }
    }
}

impl Transport for CurlTransport {
    fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirections)?;
        if let Some(agent) = &self.user_agent {
            easy.useragent(agent)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        // FTP reports its own reply codes (226 etc.); only HTTP is checked here.
        if url.scheme().starts_with("http") {
            let code = easy.response_code()?;
            if !(200..300).contains(&code) {
                return Err(FetchError::Http {
                    url: url.to_string(),
                    code,
                });
            }
        }

        tracing::debug!(url = %url, bytes = body.len(), "GET complete");
        Ok(body)
    }
}
