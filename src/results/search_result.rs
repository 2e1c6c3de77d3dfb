use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::engine::assembler::SentenceGroup;

/// Outcome of one query: matched sentences plus counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Number of match tuples across all sentences
    pub total_matches: usize,
    pub sentence_count: usize,
    /// Query duration in seconds
    pub duration: f32,
    pub groups: Vec<SentenceGroup>,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self {
            total_matches: 0,
            sentence_count: 0,
            duration: 0.0,
            groups: Vec::new(),
        }
    }

    pub fn new(groups: Vec<SentenceGroup>, duration: Duration) -> Self {
        Self {
            total_matches: groups.iter().map(|g| g.matches.len()).sum(),
            sentence_count: groups.len(),
            duration: duration.as_secs_f32(),
            groups,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// One line per sentence: address and the text with matched tokens bracketed
    pub fn summary(&self) -> String {
        let mut output = format!(
            "{} matches in {} sentences ({:.3}s)\n",
            self.total_matches, self.sentence_count, self.duration
        );
        for group in &self.groups {
            output.push_str(&format!(
                "{}\t{}\t({} matches)\n",
                group.address,
                group.highlighted_text(),
                group.matches.len()
            ));
        }
        output
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assembler::{AnnotatedToken, TokenMark};
    use crate::types::{MatchTuple, TokenRef};

    fn group() -> SentenceGroup {
        let token = |id, position, surface: &str, mark| AnnotatedToken {
            token_id: id,
            position,
            surface: surface.to_string(),
            translit: String::new(),
            gloss_string: String::new(),
            translations: Vec::new(),
            mark,
        };
        SentenceGroup {
            sentence_id: 3,
            address: "1a".to_string(),
            translation: None,
            left_context: None,
            right_context: None,
            tokens: vec![token(7, 0, "A", TokenMark::Plain), token(8, 1, "B", TokenMark::Matched)],
            matches: vec![MatchTuple::new(vec![TokenRef::new(3, 1, 8)])],
        }
    }

    #[test]
    fn test_counters_and_summary() {
        let result = SearchResult::new(vec![group()], Duration::from_millis(5));
        assert_eq!(result.total_matches, 1);
        assert_eq!(result.sentence_count, 1);
        assert!(result.summary().contains("1a\tA [B]"));
        assert!(result.to_json_pretty().contains("\"matched\""));
    }

    #[test]
    fn test_empty_result() {
        let result = SearchResult::empty();
        assert!(result.is_empty());
        assert!(result.summary().starts_with("0 matches in 0 sentences"));
    }
}
