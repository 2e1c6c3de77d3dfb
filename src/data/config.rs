//! Column mapping for annotation files

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A per-token translation column and the language it holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationColumn {
    pub lang: String,
    pub column: String,
}

/// Maps annotation-file headers to record fields.
///
/// Every field has a default matching the corpus spreadsheets, so a YAML file
/// only needs to list what differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub sentence_address: String,
    pub surface: String,
    pub part_of_speech: String,
    pub stem: String,
    pub grammar: String,
    pub gloss: String,
    pub sentence_translation: String,
    pub translations: Vec<TranslationColumn>,
    pub delimiter: char,
    pub morpheme_separator: String,
    pub gloss_separator: String,
    pub syllable_separator: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            sentence_address: "ADDRESS".to_string(),
            surface: "KOR".to_string(),
            part_of_speech: "WClass".to_string(),
            stem: "ОСНОВА".to_string(),
            grammar: "Gr".to_string(),
            gloss: "GLOSS".to_string(),
            sentence_translation: "SentTrans".to_string(),
            translations: vec![
                TranslationColumn {
                    lang: "en".to_string(),
                    column: "TRANS".to_string(),
                },
                TranslationColumn {
                    lang: "ru".to_string(),
                    column: "RUS".to_string(),
                },
            ],
            delimiter: '\t',
            morpheme_separator: "=".to_string(),
            gloss_separator: "+".to_string(),
            syllable_separator: "-".to_string(),
        }
    }
}

impl ColumnConfig {
    /// Load a column mapping from a YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(anyhow!("Column config file not found: {}", path.display()));
        }

        let yaml_str = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read column config {}: {}", path.display(), e))?;

        let config: ColumnConfig = serde_yaml::from_str(&yaml_str)
            .map_err(|e| anyhow!("Invalid YAML column config in {}: {}", path.display(), e))?;

        config.validate()?;
        log::info!("Loaded column config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            return Err(anyhow!("Delimiter must be a single ASCII character, got {:?}", self.delimiter));
        }
        for (name, separator) in [
            ("morpheme_separator", &self.morpheme_separator),
            ("gloss_separator", &self.gloss_separator),
            ("syllable_separator", &self.syllable_separator),
        ] {
            if separator.is_empty() {
                return Err(anyhow!("'{}' must not be empty", name));
            }
        }
        Ok(())
    }

    /// Columns a file must contain
    pub fn required_columns(&self) -> Vec<&str> {
        vec![self.sentence_address.as_str(), self.surface.as_str()]
    }
}
