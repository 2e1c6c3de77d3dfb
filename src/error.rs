//! Error types shared by the store, the query pipeline and the loader.

use thiserror::Error;

/// Errors raised while validating or evaluating a query, or while writing
/// sentence units into the corpus store.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unsupported constraint '{kind}' on pair ({first}, {second})")]
    UnsupportedConstraint {
        kind: String,
        first: String,
        second: String,
    },

    #[error("Corpus integrity violation in sentence '{address}': {reason}")]
    CorpusIntegrity { address: String, reason: String },

    #[error("Corpus store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Corpus store is in READ-ONLY mode")]
    ReadOnly,
}

impl SearchError {
    pub fn invalid_query(message: impl Into<String>) -> Self {
        SearchError::InvalidQuery(message.into())
    }

    /// Short machine-readable name used by the API error payloads
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::InvalidQuery(_) => "InvalidQueryError",
            SearchError::UnsupportedConstraint { .. } => "UnsupportedConstraintError",
            SearchError::CorpusIntegrity { .. } => "CorpusIntegrityError",
            SearchError::Store(_) | SearchError::ReadOnly => "StoreError",
        }
    }

    /// True for errors caused by the request rather than by the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SearchError::InvalidQuery(_) | SearchError::UnsupportedConstraint { .. }
        )
    }
}
