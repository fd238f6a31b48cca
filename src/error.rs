use thiserror::Error;

/// Errors that can abort a feed parse.
///
/// Every variant is fatal to the call that produced it: a failed parse
/// never returns partial results. The variants differ in what the caller
/// should do next — see [`FeedError::is_transient`] and
/// [`FeedError::requires_reconfiguration`].
#[derive(Debug, Error)]
pub enum FeedError {
    /// The response body is not well-formed XML. The indexer is producing
    /// unusable output.
    #[error("Malformed feed: {0}")]
    MalformedFeed(String),

    /// Invalid or missing API key. The caller should stop polling this
    /// indexer until its credentials are fixed.
    #[error("Authentication failure: {0}")]
    Authentication(String),

    /// The indexer's request limit was reached. Transient — the caller
    /// should back off and retry, not disable the indexer.
    #[error("Request limit reached: {0}")]
    RateLimited(String),

    /// Any other explicit protocol-level error reported by the indexer,
    /// including HTTP errors with non-XML bodies.
    #[error("Indexer protocol error: {0}")]
    Protocol(String),

    /// A numeric field that must parse failed to parse (seeders/peers).
    #[error("Invalid {field} value {value:?}: expected an integer")]
    FieldExtraction {
        field: &'static str,
        value: String,
    },
}

impl FeedError {
    /// Whether the condition is expected to clear on its own, making a
    /// retry with backoff appropriate.
    pub fn is_transient(&self) -> bool {
        matches!(self, FeedError::RateLimited(_))
    }

    /// Whether the indexer needs operator attention (credentials) before
    /// polling it again is useful.
    pub fn requires_reconfiguration(&self) -> bool {
        matches!(self, FeedError::Authentication(_))
    }
}
