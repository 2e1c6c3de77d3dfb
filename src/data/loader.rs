//! Loads parsed sentence units into a corpus store.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::data::config::ColumnConfig;
use crate::data::parser::AnnotationParser;
use crate::data::record::SentenceUnit;
use crate::error::SearchError;
use crate::store::CorpusStore;

/// Outcome of loading one or more annotation files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub sentences_loaded: usize,
    pub tokens_loaded: usize,
    /// (sentence address, reason) of every unit that was rolled back
    pub rejected: Vec<(String, String)>,
}

impl LoadReport {
    pub fn merge(&mut self, other: LoadReport) {
        self.sentences_loaded += other.sentences_loaded;
        self.tokens_loaded += other.tokens_loaded;
        self.rejected.extend(other.rejected);
    }
}

pub struct CorpusLoader {
    parser: AnnotationParser,
}

impl CorpusLoader {
    pub fn new(columns: ColumnConfig) -> Self {
        Self {
            parser: AnnotationParser::new(columns),
        }
    }

    pub fn parser(&self) -> &AnnotationParser {
        &self.parser
    }

    /// Parse a file and load it as a text titled with the file name
    pub fn load_file<P: AsRef<Path>>(&self, store: &mut CorpusStore, path: P) -> Result<LoadReport> {
        let path = path.as_ref();
        let title = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let units = self.parser.parse_file(path)?;
        log::info!("Parsed {} sentences from {}", units.len(), path.display());

        self.load_units(store, &title, &units)
            .with_context(|| format!("Failed to load {}", path.display()))
    }

    /// Insert units one transaction each.
    ///
    /// Integrity violations reject only the offending unit; any other store
    /// error stops the load.
    pub fn load_units(
        &self,
        store: &mut CorpusStore,
        title: &str,
        units: &[SentenceUnit],
    ) -> Result<LoadReport, SearchError> {
        let text_id = store.upsert_text(title)?;
        let mut report = LoadReport::default();

        for unit in units {
            match store.insert_sentence(text_id, unit) {
                Ok(_) => {
                    report.sentences_loaded += 1;
                    report.tokens_loaded += unit.tokens.len();
                }
                Err(SearchError::CorpusIntegrity { address, reason }) => {
                    log::warn!("Rejected sentence '{}' of '{}': {}", address, title, reason);
                    report.rejected.push((address, reason));
                }
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "Loaded '{}': {} sentences, {} tokens, {} rejected",
            title,
            report.sentences_loaded,
            report.tokens_loaded,
            report.rejected.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::LabelRef;
    use crate::store::CorpusReader;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = "ADDRESS\tKOR\tWClass\tОСНОВА\tGr\tGLOSS\tTRANS\tRUS\tSentTrans\n\
        1a\tA\tN\tna-la\ts\tGEN\tcountry\t\tThe speech of the country\n\
        1a\tB\tV\tho\tni=ta\tTOP+IND\tdo\t\t\n\
        2b\tC\tN\tmal\tni\tTOP\tspeech\t\t\n";

    fn write_sample(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("sample.tsv");
        fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn test_reloading_a_file_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir);
        let mut store = CorpusStore::open_in_memory().unwrap();
        let loader = CorpusLoader::new(ColumnConfig::default());

        let first = loader.load_file(&mut store, &path).unwrap();
        assert_eq!(first.sentences_loaded, 2);
        assert_eq!(first.tokens_loaded, 3);
        assert!(first.rejected.is_empty());
        let after_first = store.corpus_stats().unwrap();

        let second = loader.load_file(&mut store, &path).unwrap();
        assert_eq!(second.sentences_loaded, 0);
        assert_eq!(second.rejected.len(), 2);
        assert_eq!(store.corpus_stats().unwrap(), after_first);
        assert_eq!(after_first.count("text"), 1);
    }

    #[test]
    fn test_loaded_glosses_are_searchable() {
        let mut store = CorpusStore::open_in_memory().unwrap();
        let loader = CorpusLoader::new(ColumnConfig::default());
        let units = loader.parser().parse_str(SAMPLE).unwrap();
        loader.load_units(&mut store, "sample.tsv", &units).unwrap();

        let both = store
            .lookup_by_glosses(&[LabelRef::Name("TOP".into()), LabelRef::Name("IND".into())])
            .unwrap();
        assert_eq!(both.len(), 1);

        let top = store.lookup_by_glosses(&[LabelRef::Name("TOP".into())]).unwrap();
        assert_eq!(top.len(), 2);

        let tokens = store.sentence_tokens(1).unwrap();
        assert_eq!(tokens[1].translit, "ho=ni=ta");
        assert_eq!(tokens[1].gloss_string, "TOP+IND");
    }

    #[test]
    fn test_bad_unit_is_rejected_and_others_kept() {
        let mut store = CorpusStore::open_in_memory().unwrap();
        let loader = CorpusLoader::new(ColumnConfig::default());
        let mut units = loader.parser().parse_str(SAMPLE).unwrap();
        units[0].tokens[1].position = 0;

        let report = loader.load_units(&mut store, "sample.tsv", &units).unwrap();
        assert_eq!(report.sentences_loaded, 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, "1a");
        assert_eq!(store.corpus_stats().unwrap().count("token"), 1);
    }
}
