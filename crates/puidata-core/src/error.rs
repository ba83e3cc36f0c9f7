//! Error taxonomy for the cached-fetch pipeline.
//!
//! Every variant is terminal for the current invocation: nothing here is
//! retried or recovered locally.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Neither a URL nor a filename was given, so there is nothing to look up.
    #[error("descriptor has neither a url nor a filename")]
    InvalidDescriptor,

    /// The requested archive member is absent and the fallback index is out of range.
    #[error("{}", member_not_found(requested.as_deref(), *index, *available))]
    MemberNotFound {
        requested: Option<String>,
        index: usize,
        available: usize,
    },

    /// Payload could not be read in the expected format.
    #[error("could not parse {format} data: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    /// Result could not be written in the cache format.
    #[error("could not serialize {format} data: {message}")]
    Serialize {
        format: &'static str,
        message: String,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// API key missing from both the command line and the environment.
    #[error("missing API key: pass it as the first argument or set the {env_var} environment variable")]
    MissingCredential { env_var: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    pub fn parse(format: &'static str, err: impl std::fmt::Display) -> Self {
        PipelineError::Parse {
            format,
            message: err.to_string(),
        }
    }

    pub fn serialize(format: &'static str, err: impl std::fmt::Display) -> Self {
        PipelineError::Serialize {
            format,
            message: err.to_string(),
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        PipelineError::Io {
            context: context.into(),
            source,
        }
    }
}

fn member_not_found(requested: Option<&str>, index: usize, available: usize) -> String {
    match requested {
        Some(name) => format!(
            "archive member {:?} not found and fallback index {} is out of range ({} member(s))",
            name, index, available
        ),
        None => format!(
            "archive member index {} is out of range ({} member(s))",
            index, available
        ),
    }
}

/// Transport-layer failure. Exactly one attempt is made per fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// libcurl reported an error (DNS, refused connection, TLS, ...).
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),

    /// Response had a non-2xx status.
    #[error("GET {url} returned HTTP {code}")]
    Http { url: String, code: u32 },

    /// Local source path could not be read.
    #[error("open {}: {source}", path.display())]
    Local {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
