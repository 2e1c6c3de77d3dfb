use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Storage id of a sentence row
pub type SentenceId = i64;

/// Storage id of a token row
pub type TokenId = i64;

/// A single token occurrence: (sentence, position in sentence, token id).
///
/// Field order matters: the derived `Ord` sorts by sentence first and then by
/// position, which is the grouping and presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenRef {
    pub sentence_id: SentenceId,
    pub position: u32,
    pub token_id: TokenId,
}

impl TokenRef {
    pub fn new(sentence_id: SentenceId, position: u32, token_id: TokenId) -> Self {
        Self {
            sentence_id,
            position,
            token_id,
        }
    }
}

/// Tokens matching one query word; order is irrelevant
pub type CandidateSet = HashSet<TokenRef>;

/// One valid assignment of tokens to query words, in query word order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchTuple {
    pub tokens: Vec<TokenRef>,
}

impl MatchTuple {
    pub fn new(tokens: Vec<TokenRef>) -> Self {
        Self { tokens }
    }

    /// Sentence shared by every token of the tuple
    pub fn sentence_id(&self) -> Option<SentenceId> {
        self.tokens.first().map(|t| t.sentence_id)
    }

    /// Token bound to the query word at `index` in word order
    pub fn get(&self, index: usize) -> Option<&TokenRef> {
        self.tokens.get(index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains_token(&self, token_id: TokenId) -> bool {
        self.tokens.iter().any(|t| t.token_id == token_id)
    }
}
