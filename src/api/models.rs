use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::engine::{AnnotatedToken, SentenceGroup};
use crate::error::SearchError;
use crate::results::SearchResult;
use crate::store::{CorpusStats, Label, TokenTranslation};
use crate::types::MatchTuple;

/// Response model for search results
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    /// Query word names; every match lists its tokens in this order
    #[schema(example = json!(["0", "1"]))]
    pub words: Vec<String>,
    /// Query execution duration in seconds
    #[schema(example = 0.004)]
    pub duration: f32,
    /// Number of match tuples
    #[schema(example = 12)]
    pub total_matches: usize,
    /// Number of sentences with at least one match
    #[schema(example = 9)]
    pub sentence_count: usize,
    pub sentences: Vec<SentenceResult>,
}

/// A matched sentence with its neighbours
#[derive(Debug, Serialize, ToSchema)]
pub struct SentenceResult {
    #[schema(example = 42)]
    pub sentence_id: i64,
    /// Sentence address from the source file
    #[schema(example = "1a")]
    pub address: String,
    /// Surface forms joined by spaces
    pub text: String,
    pub translation: Option<String>,
    pub left_context: Option<String>,
    pub right_context: Option<String>,
    pub tokens: Vec<TokenResult>,
    pub matches: Vec<MatchResult>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResult {
    #[schema(example = 0)]
    pub position: u32,
    #[schema(example = "나랏")]
    pub surface: String,
    #[schema(example = "na-la=s")]
    pub translit: String,
    #[schema(example = "GEN")]
    pub gloss: String,
    /// Per-language token translations
    #[schema(example = json!({"en": "country"}))]
    pub translations: BTreeMap<String, String>,
    /// True if a query word is bound to this token
    pub matched: bool,
}

/// Positions bound to the query words, in word order
#[derive(Debug, Serialize, ToSchema)]
pub struct MatchResult {
    #[schema(example = json!([0, 1]))]
    pub positions: Vec<u32>,
}

/// Part-of-speech tag or gloss
#[derive(Debug, Serialize, ToSchema)]
pub struct LabelResponse {
    #[schema(example = 3)]
    pub id: i64,
    #[schema(example = "TOP")]
    pub name: String,
}

/// Error response model
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    #[schema(example = "Invalid query: constraint refers to unknown word 'x'")]
    pub error: String,
    /// Error type
    #[schema(example = "InvalidQueryError")]
    pub error_type: String,
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    #[schema(example = "healthy")]
    pub status: String,
    /// Service name
    #[schema(example = "Middle Korean Corpus API")]
    pub service: String,
}

/// Corpus statistics response
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    #[schema(example = 1520)]
    pub sentences: i64,
    #[schema(example = 18873)]
    pub tokens: i64,
    /// Row count of every table
    pub tables: BTreeMap<String, i64>,
}

impl SearchResponse {
    pub fn new(words: Vec<String>, result: SearchResult) -> Self {
        Self {
            words,
            duration: result.duration,
            total_matches: result.total_matches,
            sentence_count: result.sentence_count,
            sentences: result.groups.into_iter().map(SentenceResult::from).collect(),
        }
    }
}

impl From<SentenceGroup> for SentenceResult {
    fn from(group: SentenceGroup) -> Self {
        Self {
            sentence_id: group.sentence_id,
            text: group.text(),
            address: group.address,
            translation: group.translation,
            left_context: group.left_context,
            right_context: group.right_context,
            tokens: group.tokens.into_iter().map(TokenResult::from).collect(),
            matches: group.matches.into_iter().map(MatchResult::from).collect(),
        }
    }
}

impl From<AnnotatedToken> for TokenResult {
    fn from(token: AnnotatedToken) -> Self {
        let matched = token.is_matched();
        Self {
            position: token.position,
            surface: token.surface,
            translit: token.translit,
            gloss: token.gloss_string,
            translations: token
                .translations
                .into_iter()
                .map(|TokenTranslation { lang, text }| (lang, text))
                .collect(),
            matched,
        }
    }
}

impl From<MatchTuple> for MatchResult {
    fn from(tuple: MatchTuple) -> Self {
        Self {
            positions: tuple.tokens.iter().map(|t| t.position).collect(),
        }
    }
}

impl From<Label> for LabelResponse {
    fn from(label: Label) -> Self {
        Self {
            id: label.id,
            name: label.name,
        }
    }
}

impl From<CorpusStats> for StatsResponse {
    fn from(stats: CorpusStats) -> Self {
        Self {
            sentences: stats.count("sentence"),
            tokens: stats.count("token"),
            tables: stats.tables,
        }
    }
}

impl From<&SearchError> for ErrorResponse {
    fn from(error: &SearchError) -> Self {
        Self {
            error: error.to_string(),
            error_type: error.kind().to_string(),
        }
    }
}
