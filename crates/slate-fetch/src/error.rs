use slate_source::SourceError;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Filters were requested against a collection that does not keep its
    /// source. Reported against the request, not the hit.
    #[error(
        "unable to fetch fields from _source field: _source is disabled in the mappings for index [{index}]"
    )]
    InvalidRequest { index: String },

    #[error("invalid source filter pattern [{pattern}]")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("error filtering source")]
    Encoding {
        #[source]
        source: SourceError,
    },

    #[error("failed to decode source: {0}")]
    Decode(#[source] SourceError),
}

impl FetchError {
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            FetchError::InvalidRequest { .. } | FetchError::InvalidPattern { .. }
        )
    }

    /// Every input is already in memory, so running the same hit again
    /// cannot produce a different outcome.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
