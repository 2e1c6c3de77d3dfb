use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::data::config::ColumnConfig;
use crate::data::record::{AnnotationRecord, Morph, SentenceUnit, StemForm};
use crate::store::TokenTranslation;

/// Header positions resolved once per file
struct ColumnIndex {
    address: usize,
    surface: usize,
    pos: Option<usize>,
    stem: Option<usize>,
    grammar: Option<usize>,
    gloss: Option<usize>,
    sentence_translation: Option<usize>,
    translations: Vec<(String, usize)>,
}

/// Parser for tab/comma separated annotation files (plain or gzipped)
pub struct AnnotationParser {
    columns: ColumnConfig,
}

impl AnnotationParser {
    pub fn new(columns: ColumnConfig) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &ColumnConfig {
        &self.columns
    }

    /// Parse a file, detecting gzip compression from its magic bytes
    pub fn parse_file<P: AsRef<Path>>(&self, file_path: P) -> Result<Vec<SentenceUnit>> {
        let path = file_path.as_ref();
        let mut reader = BufReader::new(File::open(path).with_context(|| format!("Failed to open {}", path.display()))?);

        let mut magic = [0u8; 2];
        let is_gzip = match reader.read_exact(&mut magic) {
            Ok(()) => magic == [0x1f, 0x8b],
            Err(_) => false,
        };

        let file = File::open(path)?;
        let units = if is_gzip {
            self.parse_reader(GzDecoder::new(file))
        } else {
            self.parse_reader(file)
        };
        units.with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse_str(&self, content: &str) -> Result<Vec<SentenceUnit>> {
        self.parse_reader(content.as_bytes())
    }

    /// Parse annotation rows and group them into sentences.
    ///
    /// Sentences keep the order in which their address first appears; the
    /// position of a token is its row order within the sentence.
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Vec<SentenceUnit>> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(self.columns.delimiter as u8)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let index = self.resolve_columns(&headers)?;

        let mut units: Vec<SentenceUnit> = Vec::new();
        let mut unit_by_address: HashMap<String, usize> = HashMap::new();

        for (row_idx, row) in csv_reader.records().enumerate() {
            let row = row.with_context(|| format!("Malformed row {}", row_idx + 2))?;
            let address = field(&row, Some(index.address));
            if address.is_empty() {
                log::warn!("Row {} has no sentence address, skipping", row_idx + 2);
                continue;
            }

            let record = self.record_from_row(&row, &index, address);
            let slot = *unit_by_address.entry(address.to_string()).or_insert_with(|| {
                units.push(SentenceUnit::new(address));
                units.len() - 1
            });
            units[slot].push(record);
        }

        Ok(units)
    }

    fn resolve_columns(&self, headers: &StringRecord) -> Result<ColumnIndex> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<&str> = self
            .columns
            .required_columns()
            .into_iter()
            .filter(|name| find(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(anyhow!("Missing required columns: {:?}", missing));
        }

        let optional = |name: &str| {
            let position = find(name);
            if position.is_none() {
                log::warn!("Column '{}' not found, its values are treated as empty", name);
            }
            position
        };

        Ok(ColumnIndex {
            address: find(self.columns.sentence_address.as_str()).unwrap_or_default(),
            surface: find(self.columns.surface.as_str()).unwrap_or_default(),
            pos: optional(self.columns.part_of_speech.as_str()),
            stem: optional(self.columns.stem.as_str()),
            grammar: optional(self.columns.grammar.as_str()),
            gloss: optional(self.columns.gloss.as_str()),
            sentence_translation: optional(self.columns.sentence_translation.as_str()),
            translations: self
                .columns
                .translations
                .iter()
                .filter_map(|t| optional(t.column.as_str()).map(|i| (t.lang.clone(), i)))
                .collect(),
        })
    }

    fn record_from_row(&self, row: &StringRecord, index: &ColumnIndex, address: &str) -> AnnotationRecord {
        let mut record = AnnotationRecord::new(address, 0, field(row, Some(index.surface)));

        let pos = field(row, index.pos);
        if !pos.is_empty() {
            record.part_of_speech = Some(pos.to_string());
        }

        let stem = field(row, index.stem);
        if !stem.is_empty() {
            record.stem = Some(StemForm::from_syllables(stem, &self.columns.syllable_separator));
        }

        record.grammar = self.split_grammar(field(row, index.grammar), field(row, index.gloss), address);

        record.translations = index
            .translations
            .iter()
            .filter_map(|(lang, i)| {
                let text = field(row, Some(*i));
                (!text.is_empty()).then(|| TokenTranslation {
                    lang: lang.clone(),
                    text: text.to_string(),
                })
            })
            .collect();

        let sentence_translation = field(row, index.sentence_translation);
        if !sentence_translation.is_empty() {
            record.sentence_translation = Some(sentence_translation.to_string());
        }

        record
    }

    /// Zip morphemes with glosses slot by slot
    fn split_grammar(&self, grammar: &str, glosses: &str, address: &str) -> Vec<Morph> {
        if grammar.is_empty() || glosses.is_empty() {
            return Vec::new();
        }
        let morphemes: Vec<&str> = grammar.split(self.columns.morpheme_separator.as_str()).collect();
        let labels: Vec<&str> = glosses.split(self.columns.gloss_separator.as_str()).collect();
        if morphemes.len() != labels.len() {
            log::warn!(
                "Sentence '{}': grammar '{}' has {} morphemes but gloss '{}' has {} labels",
                address,
                grammar,
                morphemes.len(),
                glosses,
                labels.len()
            );
        }

        morphemes
            .iter()
            .zip(labels.iter())
            .map(|(m, g)| (m.trim(), g.trim()))
            .filter(|(m, g)| !m.is_empty() && !g.is_empty())
            .map(|(m, g)| Morph::new(m, g))
            .collect()
    }
}

fn field<'r>(row: &'r StringRecord, index: Option<usize>) -> &'r str {
    index.and_then(|i| row.get(i)).map(str::trim).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    const SAMPLE: &str = "ADDRESS\tKOR\tWClass\tОСНОВА\tGr\tGLOSS\tTRANS\tRUS\tSentTrans\n\
        1a\tA\tN\tna-la\ts\tGEN\tcountry\tстрана\tThe speech of the country\n\
        1a\tB\tV\tho\tni=ta\tTOP+IND\tdo\t\t\n\
        2b\tC\tN\tmal\t\t\tspeech\t\t\n";

    fn parser() -> AnnotationParser {
        AnnotationParser::new(ColumnConfig::default())
    }

    #[test]
    fn test_parse_groups_rows_into_sentences() {
        let units = parser().parse_str(SAMPLE).unwrap();
        assert_eq!(units.len(), 2);

        let first = &units[0];
        assert_eq!(first.address, "1a");
        assert_eq!(first.tokens.len(), 2);
        assert_eq!(first.translation.as_deref(), Some("The speech of the country"));
        assert_eq!(first.tokens[1].position, 1);
        assert_eq!(first.tokens[1].grammar, vec![Morph::new("ni", "TOP"), Morph::new("ta", "IND")]);
        assert_eq!(first.tokens[0].stem.as_ref().unwrap().translit, "nala");
        assert_eq!(first.tokens[0].translations.len(), 2);
        assert_eq!(first.tokens[1].translations.len(), 1);

        let second = &units[1];
        assert!(second.tokens[0].grammar.is_empty());
        assert_eq!(second.tokens[0].position, 0);
    }

    #[test]
    fn test_interleaved_addresses_keep_first_appearance_order() {
        let content = "ADDRESS\tKOR\n2\tx\n1\ty\n2\tz\n";
        let units = parser().parse_str(content).unwrap();
        assert_eq!(units.iter().map(|u| u.address.as_str()).collect::<Vec<_>>(), vec!["2", "1"]);
        assert_eq!(units[0].text(), "x z");
    }

    #[test]
    fn test_mismatched_gloss_count_is_truncated() {
        let content = "ADDRESS\tKOR\tGr\tGLOSS\n1\tx\ta=b=c\tTOP+IND\n";
        let units = parser().parse_str(content).unwrap();
        assert_eq!(units[0].tokens[0].grammar.len(), 2);
    }

    #[test]
    fn test_missing_required_columns_are_listed() {
        let err = parser().parse_str("KOR\tWClass\nx\tN\n").unwrap_err();
        assert!(err.to_string().contains("ADDRESS"));
    }

    #[test]
    fn test_parse_gzipped_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.tsv.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let units = parser().parse_file(&path).unwrap();
        assert_eq!(units.len(), 2);
    }
}
