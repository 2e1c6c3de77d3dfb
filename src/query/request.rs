//! JSON request shape and its resolution into a typed [`Query`].
//!
//! ```json
//! {
//!   "words": { "0": {"stem": null, "pos": "N", "glosses": ["TOP"]} },
//!   "constraints": { "0,1": {"linear_distance": [1, 1]} }
//! }
//! ```
//!
//! Object order of `words` is kept: it defines the word order of every
//! resulting match tuple.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::marker::PhantomData;

use super::model::{ConstraintKind, LabelRef, Query, QueryWord, WordConstraint};
use crate::error::SearchError;

/// Raw request body as sent by clients
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    #[serde(deserialize_with = "ordered_entries")]
    pub words: Vec<(String, RawWord)>,
    #[serde(default, deserialize_with = "ordered_entries")]
    pub constraints: Vec<(String, BTreeMap<String, serde_json::Value>)>,
}

/// Filters of one word as sent by clients; nulls, "" and [] mean "unset"
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWord {
    #[serde(default)]
    pub stem: Option<String>,
    #[serde(default, alias = "part_of_speech")]
    pub pos: Option<LabelRef>,
    #[serde(default)]
    pub glosses: Option<Vec<LabelRef>>,
}

impl Query {
    /// Parse and resolve a JSON query document
    pub fn from_json(json: &str) -> Result<Query, SearchError> {
        let request: QueryRequest = serde_json::from_str(json)
            .map_err(|e| SearchError::invalid_query(format!("malformed query JSON: {}", e)))?;
        request.into_query()
    }
}

impl QueryRequest {
    pub fn into_query(self) -> Result<Query, SearchError> {
        let mut seen = HashSet::new();
        let mut words = Vec::with_capacity(self.words.len());
        for (name, raw) in self.words {
            if !seen.insert(name.clone()) {
                return Err(SearchError::invalid_query(format!(
                    "query word '{}' is declared twice",
                    name
                )));
            }
            words.push(QueryWord {
                name,
                stem: raw.stem,
                part_of_speech: raw.pos,
                glosses: raw.glosses.unwrap_or_default(),
            });
        }

        let mut constraints = Vec::new();
        for (key, params) in self.constraints {
            let (first, second) = parse_pair_key(&key)?;
            for (kind, value) in params {
                let kind = parse_constraint_kind(&kind, &value, &first, &second)?;
                constraints.push(WordConstraint {
                    first: first.clone(),
                    second: second.clone(),
                    kind,
                });
            }
        }

        Ok(Query::new(words, constraints))
    }
}

/// Split a `"nameA,nameB"` constraint key
fn parse_pair_key(key: &str) -> Result<(String, String), SearchError> {
    match key.split_once(',') {
        Some((a, b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
            Ok((a.trim().to_string(), b.trim().to_string()))
        }
        _ => Err(SearchError::invalid_query(format!(
            "constraint key '{}' must have the form \"nameA,nameB\"",
            key
        ))),
    }
}

fn parse_constraint_kind(
    kind: &str,
    value: &serde_json::Value,
    first: &str,
    second: &str,
) -> Result<ConstraintKind, SearchError> {
    match kind {
        "linear_distance" | "lindist" => {
            let (min, max): (i64, i64) = serde_json::from_value(value.clone()).map_err(|_| {
                SearchError::invalid_query(format!(
                    "linear_distance on ({}, {}) must be [min, max], got {}",
                    first, second, value
                ))
            })?;
            Ok(ConstraintKind::LinearDistance { min, max })
        }
        "same_sentence" => Ok(ConstraintKind::SameSentence),
        other => Err(SearchError::UnsupportedConstraint {
            kind: other.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        }),
    }
}

/// Deserialize a JSON object into its entries, preserving document order
fn ordered_entries<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct EntriesVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a JSON object")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, V>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor(PhantomData))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_order_follows_document_order() {
        let query = Query::from_json(
            r#"{"words": {"b": {"glosses": ["IND"]}, "a": {"stem": "ho-ta"}, "c": {"pos": 7}}}"#,
        )
        .unwrap();
        assert_eq!(query.word_order(), vec!["b", "a", "c"]);
        assert_eq!(query.word("c").unwrap().part_of_speech, Some(LabelRef::Id(7)));
        assert!(query.constraints.is_empty());
    }

    #[test]
    fn test_linear_distance_and_alias() {
        let query = Query::from_json(
            r#"{"words": {"0": {"glosses": ["TOP"]}, "1": {"glosses": ["IND"]}},
                "constraints": {"0,1": {"linear_distance": [1, 1]}, "1, 0": {"lindist": [-3, -1]}}}"#,
        )
        .unwrap();
        assert_eq!(query.constraints.len(), 2);
        assert_eq!(query.constraints[0], WordConstraint::linear_distance("0", "1", 1, 1));
        assert_eq!(query.constraints[1], WordConstraint::linear_distance("1", "0", -3, -1));
    }

    #[test]
    fn test_unknown_constraint_kind_is_unsupported() {
        let err = Query::from_json(
            r#"{"words": {"0": {"stem": "a"}, "1": {"stem": "b"}},
                "constraints": {"0,1": {"dependency": "nsubj"}}}"#,
        )
        .unwrap_err();
        match err {
            SearchError::UnsupportedConstraint { kind, first, second } => {
                assert_eq!(kind, "dependency");
                assert_eq!(first, "0");
                assert_eq!(second, "1");
            }
            other => panic!("Expected UnsupportedConstraint, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_inputs_are_invalid_queries() {
        let cases = [
            r#"{"words": {"0": {"stem": "a"}}, "constraints": {"0": {"linear_distance": [1, 1]}}}"#,
            r#"{"words": {"0": {"stem": "a"}}, "constraints": {"0,0": {"linear_distance": 1}}}"#,
            r#"{"words": {"0": {"stem": "a"}, "0": {"stem": "b"}}}"#,
            r#"{"constraints": {}}"#,
        ];
        for case in cases {
            let err = Query::from_json(case).unwrap_err();
            assert!(matches!(err, SearchError::InvalidQuery(_)), "case {}: {:?}", case, err);
        }
    }

    #[test]
    fn test_null_and_empty_filters_parse_as_unset() {
        let query = Query::from_json(
            r#"{"words": {"0": {"stem": null, "pos": "", "glosses": null}}, "constraints": {}}"#,
        )
        .unwrap();
        assert!(query.words[0].is_unconstrained());
    }
}
