//! Unified SDK error types.

use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Data-service (HTTP-layer) errors.
///
/// `Reqwest`/`Timeout` are transport failures; `QueryRejected` means the
/// backend refused the query itself (malformed filter, unknown column).
/// An empty result set is never an error — it comes back as zero rows.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Query rejected: {0}")]
    QueryRejected(String),

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timeout")]
    Timeout,

    #[error("Malformed response: {0}")]
    InvalidResponse(String),

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// Filter-state errors.
#[derive(Error, Debug)]
pub enum FilterError {
    /// The `FilterProvider` backing a handle was dropped. Reading filter
    /// state outside an active provider is a programming error, so this
    /// surfaces instead of a silently defaulted filter.
    #[error("filter state accessed outside an active provider")]
    NotInitialized,
}
