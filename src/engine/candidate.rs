//! Candidate matching: one query word -> the tokens satisfying all its filters

use std::collections::HashMap;

use crate::error::SearchError;
use crate::query::{Query, QueryWord, WordFilter};
use crate::store::CorpusReader;
use crate::types::CandidateSet;

/// Tokens satisfying every filter of `word`.
///
/// Filters are intersected in the order stem, pos, glosses and evaluation
/// stops as soon as the running intersection is empty. A word without any
/// filter is rejected rather than matched against the whole corpus.
pub fn match_word<R: CorpusReader + ?Sized>(reader: &R, word: &QueryWord) -> Result<CandidateSet, SearchError> {
    let filters = word.filters();
    if filters.is_empty() {
        return Err(SearchError::invalid_query(format!(
            "query word '{}' has no stem, pos or glosses filter",
            word.name
        )));
    }

    let mut candidates: Option<CandidateSet> = None;
    for filter in &filters {
        let found = apply_filter(reader, filter)?;
        log::debug!(
            "word '{}': {} filter matched {} tokens",
            word.name,
            filter.kind_name(),
            found.len()
        );

        let narrowed = match candidates.take() {
            None => found,
            Some(current) => intersect(current, &found),
        };
        if narrowed.is_empty() {
            return Ok(narrowed);
        }
        candidates = Some(narrowed);
    }

    Ok(candidates.unwrap_or_default())
}

/// Candidate sets for every word of the query, keyed by word name
pub fn match_words<R: CorpusReader + ?Sized>(
    reader: &R,
    query: &Query,
) -> Result<HashMap<String, CandidateSet>, SearchError> {
    let mut candidates = HashMap::with_capacity(query.words.len());
    for word in &query.words {
        candidates.insert(word.name.clone(), match_word(reader, word)?);
    }
    Ok(candidates)
}

fn apply_filter<R: CorpusReader + ?Sized>(reader: &R, filter: &WordFilter) -> Result<CandidateSet, SearchError> {
    match filter {
        WordFilter::Stem(stem) => reader.lookup_by_stem(stem),
        WordFilter::PartOfSpeech(pos) => reader.lookup_by_pos(pos),
        WordFilter::Glosses(glosses) => reader.lookup_by_glosses(glosses),
    }
}

/// Iterate the smaller side, probe the larger one
fn intersect(current: CandidateSet, other: &CandidateSet) -> CandidateSet {
    if current.len() <= other.len() {
        current.into_iter().filter(|t| other.contains(t)).collect()
    } else {
        other.iter().filter(|t| current.contains(t)).copied().collect()
    }
}
