//! Search configuration types

use serde::{Deserialize, Serialize};

/// Default upper bound on the number of words in one query
pub const DEFAULT_MAX_QUERY_WORDS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Queries with more words are rejected before any store access
    pub max_query_words: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_query_words: DEFAULT_MAX_QUERY_WORDS,
        }
    }
}
