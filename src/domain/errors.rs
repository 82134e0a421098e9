//! Error types for every boundary of the scrape pipeline
//!
//! Each enum maps to one failure class: record construction, caller input,
//! page retrieval, storage, and read-side queries. Only `SubmitError` and
//! `QueryError` ever reach a caller; the rest are contained inside workers.

use thiserror::Error;

/// Violations of the `AssetRecord` invariants, raised at construction time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("original url must not be empty")]
    EmptyOriginalUrl,

    #[error("media url is not an http(s) url: '{0}'")]
    InvalidMediaUrl(String),

    #[error("media url exceeds {max} characters (got {len})")]
    MediaUrlTooLong { len: usize, max: usize },
}

/// Unknown value for the `type` discriminator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown media type '{0}', expected IMAGE or VIDEO")]
pub struct KindParseError(pub String);

/// Rejection of a scrape submission by the coordinator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("url batch must not be empty")]
    EmptyBatch,

    #[error("executor has been shut down; no new batches are accepted")]
    ExecutorClosed,
}

/// Failure to retrieve one page
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("timed out after {timeout_secs}s fetching {url}")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unsupported content type '{content_type}' at {url}")]
    UnsupportedContentType { url: String, content_type: String },

    #[error("failed to read body of {url}: {reason}")]
    Body { url: String, reason: String },
}

impl FetchError {
    /// The URL whose retrieval failed
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url, .. }
            | Self::Timeout { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::Network { url, .. }
            | Self::UnsupportedContentType { url, .. }
            | Self::Body { url, .. } => url,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Write or read failure at the storage boundary
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored row is invalid: {0}")]
    CorruptRow(String),

    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a read-side query
#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    InvalidKind(#[from] KindParseError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
