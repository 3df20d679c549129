// src/source/types.rs
use crate::posts::types::RawRecord;

/// Whole-fetch failure. Any of these fails the request; rows are never partial.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream payload could not be decoded: {0}")]
    Decode(String),

    #[error("upstream pagination exceeded {0} pages")]
    TooManyPages(usize),

    /// Canned failure for stand-in sources.
    #[error("{0}")]
    Other(String),
}

/// Where raw rows come from. One call per request, no retries.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, SourceError>;
    fn name(&self) -> &'static str;
}
