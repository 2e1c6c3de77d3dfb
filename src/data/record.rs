use serde::{Deserialize, Serialize};

use crate::store::TokenTranslation;

/// One morpheme of a grammar decomposition with its gloss
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Morph {
    pub translit: String,
    pub gloss: String,
}

impl Morph {
    pub fn new(translit: impl Into<String>, gloss: impl Into<String>) -> Self {
        Self {
            translit: translit.into(),
            gloss: gloss.into(),
        }
    }
}

/// Stem transliteration in both its syllable-delimited and flat forms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemForm {
    pub translit: String,
    pub translit_syl: String,
}

impl StemForm {
    /// Build from the syllable-delimited form, e.g. `ho-ta` -> `hota`
    pub fn from_syllables(translit_syl: &str, separator: &str) -> Self {
        Self {
            translit: translit_syl.replace(separator, ""),
            translit_syl: translit_syl.to_string(),
        }
    }
}

/// A single annotated token as read from an annotation file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub sentence_address: String,
    pub position: u32,
    pub surface: String,
    pub part_of_speech: Option<String>,
    pub stem: Option<StemForm>,
    pub grammar: Vec<Morph>,
    pub translations: Vec<TokenTranslation>,
    pub sentence_translation: Option<String>,
}

impl AnnotationRecord {
    pub fn new(sentence_address: impl Into<String>, position: u32, surface: impl Into<String>) -> Self {
        Self {
            sentence_address: sentence_address.into(),
            position,
            surface: surface.into(),
            part_of_speech: None,
            stem: None,
            grammar: Vec::new(),
            translations: Vec::new(),
            sentence_translation: None,
        }
    }

    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.part_of_speech = Some(pos.into());
        self
    }

    pub fn with_stem(mut self, translit_syl: &str) -> Self {
        self.stem = Some(StemForm::from_syllables(translit_syl, "-"));
        self
    }

    pub fn with_morph(mut self, translit: &str, gloss: &str) -> Self {
        self.grammar.push(Morph::new(translit, gloss));
        self
    }

    pub fn with_translation(mut self, lang: &str, text: &str) -> Self {
        self.translations.push(TokenTranslation {
            lang: lang.to_string(),
            text: text.to_string(),
        });
        self
    }
}

/// All tokens of one sentence: the unit of atomic ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceUnit {
    pub address: String,
    pub translation: Option<String>,
    pub tokens: Vec<AnnotationRecord>,
}

impl SentenceUnit {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            translation: None,
            tokens: Vec::new(),
        }
    }

    /// Append a token at the next position
    pub fn push(&mut self, mut record: AnnotationRecord) {
        record.position = self.tokens.len() as u32;
        if self.translation.is_none() {
            self.translation = record.sentence_translation.clone();
        }
        self.tokens.push(record);
    }

    /// Sentence text: surface forms joined by a space
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.surface.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_flattening() {
        let stem = StemForm::from_syllables("ho-ta", "-");
        assert_eq!(stem.translit, "hota");
        assert_eq!(stem.translit_syl, "ho-ta");
    }

    #[test]
    fn test_sentence_unit_assigns_positions_and_translation() {
        let mut unit = SentenceUnit::new("1a");
        unit.push(AnnotationRecord::new("1a", 99, "나랏"));
        let mut second = AnnotationRecord::new("1a", 99, "말ᄊᆞ미");
        second.sentence_translation = Some("The speech of the country".to_string());
        unit.push(second);

        assert_eq!(unit.tokens[0].position, 0);
        assert_eq!(unit.tokens[1].position, 1);
        assert_eq!(unit.translation.as_deref(), Some("The speech of the country"));
        assert_eq!(unit.text(), "나랏 말ᄊᆞ미");
    }
}
