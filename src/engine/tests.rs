//! End-to-end search tests against an in-memory corpus

use super::*;
use crate::data::record::{AnnotationRecord, SentenceUnit};
use crate::error::SearchError;
use crate::query::{LabelRef, Query, QueryWord, WordConstraint};
use crate::store::CorpusStore;

fn sentence(address: &str, tokens: Vec<AnnotationRecord>) -> SentenceUnit {
    let mut unit = SentenceUnit::new(address);
    for token in tokens {
        unit.push(token);
    }
    unit
}

fn token(address: &str, surface: &str) -> AnnotationRecord {
    AnnotationRecord::new(address, 0, surface)
}

/// Three sentences:
/// 1: A(N, TOP) B(V, IND)
/// 2: C(N, TOP) D(N) E(V, IND)
/// 3: F(V, TOP+IND+TOP)
fn corpus() -> CorpusStore {
    let mut store = CorpusStore::open_in_memory().unwrap();
    let text_id = store.upsert_text("sample.tsv").unwrap();
    let units = vec![
        sentence(
            "1",
            vec![
                token("1", "A").with_pos("N").with_stem("na-la").with_morph("s", "TOP"),
                token("1", "B").with_pos("V").with_stem("ho").with_morph("ta", "IND"),
            ],
        ),
        sentence(
            "2",
            vec![
                token("2", "C").with_pos("N").with_stem("mal").with_morph("nʌn", "TOP"),
                token("2", "D").with_pos("N").with_stem("ptu-t"),
                token("2", "E").with_pos("V").with_stem("ho").with_morph("ta", "IND"),
            ],
        ),
        sentence(
            "3",
            vec![token("3", "F")
                .with_pos("V")
                .with_stem("i")
                .with_morph("n", "TOP")
                .with_morph("ta", "IND")
                .with_morph("ɨn", "TOP")],
        ),
    ];
    for unit in &units {
        store.insert_sentence(text_id, unit).unwrap();
    }
    store
}

fn engine() -> SearchEngine<CorpusStore> {
    SearchEngine::new(corpus(), SearchConfig::default())
}

fn top_then_ind(min: i64, max: i64) -> Query {
    Query::new(
        vec![
            QueryWord::new("a").with_glosses(["TOP"]),
            QueryWord::new("b").with_glosses(["IND"]),
        ],
        vec![WordConstraint::linear_distance("a", "b", min, max)],
    )
}

#[test]
fn test_adjacent_glosses_match_once() {
    let matches = engine().match_query(&top_then_ind(1, 1)).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].sentence_id(), Some(1));
    assert_eq!(matches[0].get(0).map(|t| t.position), Some(0));
    assert_eq!(matches[0].get(1).map(|t| t.position), Some(1));
}

#[test]
fn test_wider_window_finds_the_other_sentence() {
    let matches = engine().match_query(&top_then_ind(2, 5)).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].sentence_id(), Some(2));
}

#[test]
fn test_window_without_hits_is_empty() {
    let matches = engine().match_query(&top_then_ind(3, 5)).unwrap();
    assert!(matches.is_empty());
}

#[test]
fn test_no_cross_sentence_tuples() {
    let query = Query::new(
        vec![
            QueryWord::new("a").with_stem("na-la"),
            QueryWord::new("b").with_stem("mal"),
        ],
        Vec::new(),
    );
    assert!(engine().match_query(&query).unwrap().is_empty());

    let query = Query::new(
        vec![
            QueryWord::new("a").with_glosses(["TOP"]),
            QueryWord::new("b").with_glosses(["IND"]),
        ],
        Vec::new(),
    );
    let matches = engine().match_query(&query).unwrap();
    assert!(matches
        .iter()
        .all(|m| m.tokens.iter().all(|t| Some(t.sentence_id) == m.sentence_id())));
    // sentence 1 and 2 once each, sentence 3 binds its single token to both words
    assert_eq!(matches.len(), 3);
}

#[test]
fn test_filters_are_intersected() {
    let engine = engine();
    let stem_only = Query::new(vec![QueryWord::new("w").with_stem("ho")], Vec::new());
    assert_eq!(engine.match_query(&stem_only).unwrap().len(), 2);

    let flat_stem = Query::new(vec![QueryWord::new("w").with_stem("nala")], Vec::new());
    assert_eq!(engine.match_query(&flat_stem).unwrap().len(), 1);

    let stem_and_pos = Query::new(
        vec![QueryWord::new("w").with_stem("ho").with_pos(LabelRef::name("N"))],
        Vec::new(),
    );
    assert!(engine.match_query(&stem_and_pos).unwrap().is_empty());
}

#[test]
fn test_gloss_subset_and_duplicates() {
    let engine = engine();
    let top = Query::new(vec![QueryWord::new("w").with_glosses(["TOP"])], Vec::new());
    assert_eq!(engine.match_query(&top).unwrap().len(), 3);

    let both = Query::new(vec![QueryWord::new("w").with_glosses(["IND", "TOP"])], Vec::new());
    let matches = engine.match_query(&both).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].sentence_id(), Some(3));

    let twice = Query::new(vec![QueryWord::new("w").with_glosses(["TOP", "TOP"])], Vec::new());
    let matches = engine.match_query(&twice).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].sentence_id(), Some(3));

    let unknown = Query::new(vec![QueryWord::new("w").with_glosses(["NOPE"])], Vec::new());
    assert!(engine.match_query(&unknown).unwrap().is_empty());
}

#[test]
fn test_unconstrained_word_is_rejected() {
    let engine = engine();
    let query = Query::new(
        vec![QueryWord::new("a").with_glosses(["TOP"]), QueryWord::new("b")],
        Vec::new(),
    );
    assert!(matches!(engine.match_query(&query), Err(SearchError::InvalidQuery(_))));
    assert!(matches!(
        match_word(engine.reader(), &QueryWord::new("b").with_stem("")),
        Err(SearchError::InvalidQuery(_))
    ));
}

#[test]
fn test_too_many_words_is_rejected() {
    let engine = SearchEngine::new(corpus(), SearchConfig { max_query_words: 1 });
    assert!(matches!(
        engine.match_query(&top_then_ind(1, 1)),
        Err(SearchError::InvalidQuery(_))
    ));
}

#[test]
fn test_search_assembles_groups_with_context() {
    let result = engine().search(&top_then_ind(1, 5)).unwrap();
    assert_eq!(result.sentence_count, 2);
    assert_eq!(result.total_matches, 2);

    let first = &result.groups[0];
    assert_eq!(first.sentence_id, 1);
    assert_eq!(first.left_context, None);
    assert_eq!(first.right_context.as_deref(), Some("C D E"));
    assert!(first.tokens.iter().all(|t| t.is_matched()));

    let second = &result.groups[1];
    assert_eq!(second.left_context.as_deref(), Some("A B"));
    assert_eq!(second.right_context.as_deref(), Some("F"));
    let marks: Vec<TokenMark> = second.tokens.iter().map(|t| t.mark).collect();
    assert_eq!(marks, vec![TokenMark::Matched, TokenMark::Plain, TokenMark::Matched]);
    assert_eq!(second.tokens[0].translit, "mal=nʌn");
    assert_eq!(second.tokens[0].gloss_string, "TOP");
}

#[test]
fn test_last_sentence_has_no_right_context() {
    let query = Query::new(vec![QueryWord::new("w").with_stem("i")], Vec::new());
    let result = engine().search(&query).unwrap();
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].left_context.as_deref(), Some("C D E"));
    assert_eq!(result.groups[0].right_context, None);
}

#[test]
fn test_json_query_end_to_end() {
    let query = Query::from_json(
        r#"{"words": {"0": {"glosses": ["TOP"]}, "1": {"pos": "V", "glosses": ["IND"]}},
            "constraints": {"0,1": {"lindist": [1, 1]}}}"#,
    )
    .unwrap();
    let result = engine().search(&query).unwrap();
    assert_eq!(result.total_matches, 1);
    assert_eq!(result.groups[0].address, "1");
}

#[test]
fn test_label_listings() {
    let engine = engine();
    let pos: Vec<String> = engine.pos_tags().unwrap().into_iter().map(|l| l.name).collect();
    assert_eq!(pos, vec!["N", "V"]);
    let glosses: Vec<String> = engine.glosses().unwrap().into_iter().map(|l| l.name).collect();
    assert_eq!(glosses, vec!["IND", "TOP"]);
}
