//! Core SearchEngine struct and constructor

use crate::engine::config::SearchConfig;
use crate::store::CorpusReader;

/// Search façade over a corpus reader.
///
/// The engine holds no per-query state; every call owns its intermediate
/// candidate sets and drops them when it returns.
pub struct SearchEngine<R: CorpusReader> {
    pub(crate) reader: R,
    pub(crate) config: SearchConfig,
}

impl<R: CorpusReader> SearchEngine<R> {
    pub fn new(reader: R, config: SearchConfig) -> Self {
        log::info!("Search engine ready (max {} query words)", config.max_query_words);
        Self { reader, config }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}
