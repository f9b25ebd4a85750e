/// Errors from the search layer.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Meilisearch returned a non-2xx status code.
    #[error("Meilisearch API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A stored document could not be mapped back to a project.
    #[error("Invalid search document: {0}")]
    InvalidDocument(String),

    /// The backing index is not reachable (in-memory repository switched off).
    #[error("Search index unavailable")]
    Unavailable,
}
