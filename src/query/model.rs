//! Typed multi-word query: query words with filters, and pairwise constraints.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::TokenRef;

/// Reference to a lookup-table row, either by numeric id or by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelRef {
    Id(i64),
    Name(String),
}

impl LabelRef {
    pub fn name(name: impl Into<String>) -> Self {
        LabelRef::Name(name.into())
    }

    /// Empty names are treated as "no filter"
    pub fn is_blank(&self) -> bool {
        matches!(self, LabelRef::Name(n) if n.trim().is_empty())
    }
}

impl fmt::Display for LabelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelRef::Id(id) => write!(f, "#{}", id),
            LabelRef::Name(name) => f.write_str(name),
        }
    }
}

/// Closed set of per-word filter kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordFilter {
    Stem(String),
    PartOfSpeech(LabelRef),
    Glosses(Vec<LabelRef>),
}

impl WordFilter {
    pub fn kind_name(&self) -> &'static str {
        match self {
            WordFilter::Stem(_) => "stem",
            WordFilter::PartOfSpeech(_) => "pos",
            WordFilter::Glosses(_) => "glosses",
        }
    }
}

/// A named slot of the query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryWord {
    pub name: String,
    pub stem: Option<String>,
    pub part_of_speech: Option<LabelRef>,
    pub glosses: Vec<LabelRef>,
}

impl QueryWord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_stem(mut self, stem: impl Into<String>) -> Self {
        self.stem = Some(stem.into());
        self
    }

    pub fn with_pos(mut self, pos: LabelRef) -> Self {
        self.part_of_speech = Some(pos);
        self
    }

    pub fn with_glosses<I, S>(mut self, glosses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.glosses = glosses.into_iter().map(|g| LabelRef::Name(g.into())).collect();
        self
    }

    /// Active filters in evaluation order (stem, pos, glosses)
    pub fn filters(&self) -> Vec<WordFilter> {
        let mut filters = Vec::with_capacity(3);
        if let Some(stem) = self.stem.as_ref().filter(|s| !s.is_empty()) {
            filters.push(WordFilter::Stem(stem.clone()));
        }
        if let Some(pos) = self.part_of_speech.as_ref().filter(|p| !p.is_blank()) {
            filters.push(WordFilter::PartOfSpeech(pos.clone()));
        }
        let glosses: Vec<LabelRef> = self.glosses.iter().filter(|g| !g.is_blank()).cloned().collect();
        if !glosses.is_empty() {
            filters.push(WordFilter::Glosses(glosses));
        }
        filters
    }

    pub fn is_unconstrained(&self) -> bool {
        self.filters().is_empty()
    }
}

/// Closed set of pairwise constraint kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// `min <= position(second) - position(first) <= max`
    LinearDistance { min: i64, max: i64 },
    SameSentence,
}

impl ConstraintKind {
    pub fn accepts(&self, first: &TokenRef, second: &TokenRef) -> bool {
        match *self {
            ConstraintKind::LinearDistance { min, max } => {
                let distance = i64::from(second.position) - i64::from(first.position);
                min <= distance && distance <= max
            }
            ConstraintKind::SameSentence => first.sentence_id == second.sentence_id,
        }
    }
}

/// Constraint between two named query words; direction is `first -> second`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordConstraint {
    pub first: String,
    pub second: String,
    pub kind: ConstraintKind,
}

impl WordConstraint {
    pub fn linear_distance(first: impl Into<String>, second: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            kind: ConstraintKind::LinearDistance { min, max },
        }
    }
}

/// A complete query. Word order is the order of `words`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    pub words: Vec<QueryWord>,
    pub constraints: Vec<WordConstraint>,
}

impl Query {
    pub fn new(words: Vec<QueryWord>, constraints: Vec<WordConstraint>) -> Self {
        Self { words, constraints }
    }

    pub fn word_order(&self) -> Vec<String> {
        self.words.iter().map(|w| w.name.clone()).collect()
    }

    pub fn word(&self, name: &str) -> Option<&QueryWord> {
        self.words.iter().find(|w| w.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_filters_are_ignored() {
        let word = QueryWord {
            name: "0".to_string(),
            stem: Some(String::new()),
            part_of_speech: Some(LabelRef::name("")),
            glosses: vec![LabelRef::name(" ")],
        };
        assert!(word.is_unconstrained());
    }

    #[test]
    fn test_filters_keep_fixed_order() {
        let word = QueryWord::new("w")
            .with_glosses(["TOP"])
            .with_pos(LabelRef::Id(7))
            .with_stem("ho-ta");
        let kinds: Vec<&str> = word.filters().iter().map(|f| f.kind_name()).collect();
        assert_eq!(kinds, vec!["stem", "pos", "glosses"]);
    }

    #[test]
    fn test_linear_distance_is_directional() {
        let kind = ConstraintKind::LinearDistance { min: 1, max: 2 };
        let a = TokenRef::new(1, 3, 30);
        let b = TokenRef::new(1, 5, 50);
        assert!(kind.accepts(&a, &b));
        assert!(!kind.accepts(&b, &a));
        assert!(!kind.accepts(&a, &a));
    }
}
