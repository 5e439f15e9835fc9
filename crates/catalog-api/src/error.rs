//! Errors raised while talking to the catalogue API.

use thiserror::Error;

/// Failure of a single catalogue request
///
/// Requests are never retried; callers decide how to surface the failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid request URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid record from {url}: {source}")]
    InvalidRecord {
        url: String,
        #[source]
        source: crate::api::RecordError,
    },
}

impl FetchError {
    /// URL of the failed request
    pub fn url(&self) -> &str {
        match self {
            FetchError::InvalidUrl { url, .. }
            | FetchError::Network { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Decode { url, .. }
            | FetchError::InvalidRecord { url, .. } => url,
        }
    }

    /// Whether the server reported that the record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FetchError::Status { status, .. } if *status == reqwest::StatusCode::NOT_FOUND
        )
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
