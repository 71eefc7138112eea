//! Error types for the export pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by the API client and the export pipeline
pub type Result<T> = std::result::Result<T, ExportError>;

/// Everything that can go wrong between the remote catalog and a tagged file
///
/// Whether an error aborts a run is decided by the caller: listing calls made
/// while setting up a batch propagate, per-track failures are counted and the
/// batch moves on.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No usable access token
    #[error("configuration error: {0}")]
    Config(String),

    /// A required argument was missing or empty
    #[error("usage error: {0}")]
    Usage(String),

    /// The current account could not be determined
    #[error("could not resolve account: {0}")]
    Resolution(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with something other than 200 OK
    #[error("API error: status {status}, response: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Stage one of link resolution yielded nothing to follow
    #[error("no downloadable rendition: {0}")]
    NoRendition(String),

    /// Stage two of link resolution failed
    #[error("bad download descriptor: {0}")]
    Descriptor(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write tags: {0}")]
    Tag(String),
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn decode(what: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { what, source }
    }
}

impl From<lofty::error::LoftyError> for ExportError {
    fn from(err: lofty::error::LoftyError) -> Self {
        Self::Tag(err.to_string())
    }
}
