//! Query execution methods for SearchEngine

use std::time::Instant;

use crate::engine::assembler::assemble;
use crate::engine::candidate::match_words;
use crate::engine::core::SearchEngine;
use crate::engine::evaluator::evaluate;
use crate::error::SearchError;
use crate::query::Query;
use crate::results::SearchResult;
use crate::store::{CorpusReader, Label};
use crate::types::MatchTuple;

impl<R: CorpusReader> SearchEngine<R> {
    /// Match tuples of `query`, in word order, unsorted
    pub fn match_query(&self, query: &Query) -> Result<Vec<MatchTuple>, SearchError> {
        self.check_limits(query)?;

        let candidates = match_words(&self.reader, query)?;
        let matches = evaluate(&candidates, &query.constraints, &query.word_order())?;
        log::debug!("query produced {} match tuples", matches.len());
        Ok(matches)
    }

    /// Run `query` and assemble the matched sentences
    pub fn search(&self, query: &Query) -> Result<SearchResult, SearchError> {
        let start = Instant::now();
        let matches = self.match_query(query)?;
        let groups = assemble(&self.reader, &matches)?;
        let result = SearchResult::new(groups, start.elapsed());
        log::debug!(
            "{} matches in {} sentences ({:.3}s)",
            result.total_matches,
            result.sentence_count,
            result.duration
        );
        Ok(result)
    }

    pub fn pos_tags(&self) -> Result<Vec<Label>, SearchError> {
        self.reader.list_pos_tags()
    }

    pub fn glosses(&self) -> Result<Vec<Label>, SearchError> {
        self.reader.list_glosses()
    }

    fn check_limits(&self, query: &Query) -> Result<(), SearchError> {
        if query.words.is_empty() {
            return Err(SearchError::invalid_query("query has no words"));
        }
        if query.words.len() > self.config.max_query_words {
            return Err(SearchError::invalid_query(format!(
                "query has {} words, at most {} are allowed",
                query.words.len(),
                self.config.max_query_words
            )));
        }
        Ok(())
    }
}
