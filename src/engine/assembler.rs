//! Groups match tuples by sentence and attaches the annotated sentence text

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::SearchError;
use crate::store::{CorpusReader, TokenTranslation};
use crate::types::{MatchTuple, SentenceId, TokenId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenMark {
    /// Bound to a query word by at least one tuple of the sentence
    Matched,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedToken {
    pub token_id: TokenId,
    pub position: u32,
    pub surface: String,
    pub translit: String,
    pub gloss_string: String,
    pub translations: Vec<TokenTranslation>,
    pub mark: TokenMark,
}

impl AnnotatedToken {
    pub fn is_matched(&self) -> bool {
        self.mark == TokenMark::Matched
    }
}

/// All matches found in one sentence, with its neighbours as context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceGroup {
    pub sentence_id: SentenceId,
    pub address: String,
    pub translation: Option<String>,
    pub left_context: Option<String>,
    pub right_context: Option<String>,
    pub tokens: Vec<AnnotatedToken>,
    pub matches: Vec<MatchTuple>,
}

impl SentenceGroup {
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.surface.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Sentence text with matched tokens wrapped in `[..]`
    pub fn highlighted_text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| {
                if t.is_matched() {
                    format!("[{}]", t.surface)
                } else {
                    t.surface.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Build one group per sentence, ascending by sentence id
pub fn assemble<R: CorpusReader + ?Sized>(reader: &R, matches: &[MatchTuple]) -> Result<Vec<SentenceGroup>, SearchError> {
    let mut by_sentence: BTreeMap<SentenceId, Vec<MatchTuple>> = BTreeMap::new();
    for tuple in matches {
        if let Some(sentence_id) = tuple.sentence_id() {
            by_sentence.entry(sentence_id).or_default().push(tuple.clone());
        }
    }

    let mut groups = Vec::with_capacity(by_sentence.len());
    for (sentence_id, tuples) in by_sentence {
        let matched: HashSet<TokenId> = tuples.iter().flat_map(|m| m.tokens.iter().map(|t| t.token_id)).collect();

        let tokens = reader
            .sentence_tokens(sentence_id)?
            .into_iter()
            .map(|t| AnnotatedToken {
                mark: if matched.contains(&t.token_id) {
                    TokenMark::Matched
                } else {
                    TokenMark::Plain
                },
                token_id: t.token_id,
                position: t.position,
                surface: t.surface,
                translit: t.translit,
                gloss_string: t.gloss_string,
                translations: t.translations,
            })
            .collect();

        let info = reader.sentence_info(sentence_id)?;
        let context = reader.sentence_context(sentence_id)?;

        groups.push(SentenceGroup {
            sentence_id,
            address: info.as_ref().map(|i| i.address.clone()).unwrap_or_default(),
            translation: info.and_then(|i| i.translation),
            left_context: context.left,
            right_context: context.right,
            tokens,
            matches: tuples,
        });
    }

    Ok(groups)
}
