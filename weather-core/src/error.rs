use thiserror::Error;

/// Raised when user input cannot become a search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Search query cannot be empty")]
    EmptyQuery,
}

/// Failure modes of a single weather lookup.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider answered, but not with a success status.
    #[error("City not found (provider returned status {status})")]
    NotFound { status: u16 },

    /// The request never produced a readable response.
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered 200 with a body we could not decode.
    #[error("Failed to parse weather response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}
