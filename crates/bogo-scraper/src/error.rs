use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {endpoint} (retry after {retry_after_secs}s)")]
    RateLimited {
        endpoint: String,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("{endpoint} reported status \"{status}\"")]
    ApiStatus { endpoint: String, status: String },

    #[error("unexpected payload from {context}: {reason}")]
    UnexpectedPayload { context: String, reason: String },

    #[error("pagination limit reached: exceeded {max_pages} listing pages")]
    PaginationLimit { max_pages: usize },

    #[error("no location matches \"{query}\"")]
    LocationNotFound { query: String },

    #[error("storefront {storefront_id} is missing required field `{field}`")]
    MalformedDocument {
        storefront_id: String,
        field: &'static str,
    },

    #[error("discovery run exceeded {secs}s timeout")]
    Timeout { secs: u64 },

    #[error("invalid upstream base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("fetch admission control was closed")]
    AdmissionClosed,
}

/// Coarse classification used by callers to decide how to surface an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The address matched no location.
    NotFound,
    /// A required upstream exchange failed at the transport, status, or
    /// payload level.
    Upstream,
    /// The run did not finish inside its time budget.
    Timeout,
    Internal,
}

impl ScraperError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LocationNotFound { .. } => ErrorKind::NotFound,
            Self::Http(_)
            | Self::Deserialize { .. }
            | Self::RateLimited { .. }
            | Self::UnexpectedStatus { .. }
            | Self::ApiStatus { .. }
            | Self::UnexpectedPayload { .. }
            | Self::PaginationLimit { .. }
            | Self::MalformedDocument { .. } => ErrorKind::Upstream,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::InvalidBaseUrl { .. } | Self::AdmissionClosed => ErrorKind::Internal,
        }
    }
}
