//! Constraint evaluation over per-word candidate sets.
//!
//! The cartesian product of the candidate sets is never built. Candidates are
//! bucketed by sentence, and only sentences present in every bucket are
//! visited. Inside a sentence a backtracking search binds one word at a time:
//! it starts with the word that has the fewest candidates and then prefers
//! words constrained by words that are already bound. Each bound neighbour
//! narrows the position window of the next word, which is located with a
//! binary search over the position-sorted bucket.
//!
//! The worst case is still exponential in the number of query words when
//! many candidates of every word share a sentence and the words are not
//! linked by distance constraints; callers bound the number of words.

use std::collections::HashMap;

use crate::error::SearchError;
use crate::query::{ConstraintKind, WordConstraint};
use crate::types::{CandidateSet, MatchTuple, SentenceId, TokenRef};

/// A constraint with word names resolved to indices in word order
#[derive(Debug, Clone, Copy)]
struct Link {
    first: usize,
    second: usize,
    kind: ConstraintKind,
}

/// Every tuple, in word order, that shares a sentence and satisfies all constraints
pub fn evaluate(
    candidates: &HashMap<String, CandidateSet>,
    constraints: &[WordConstraint],
    word_order: &[String],
) -> Result<Vec<MatchTuple>, SearchError> {
    let links = resolve_links(constraints, word_order)?;

    let mut sets = Vec::with_capacity(word_order.len());
    for name in word_order {
        let set = candidates
            .get(name)
            .ok_or_else(|| SearchError::invalid_query(format!("no candidates were computed for word '{}'", name)))?;
        sets.push(set);
    }
    if sets.is_empty() || sets.iter().any(|s| s.is_empty()) {
        return Ok(Vec::new());
    }

    let buckets: Vec<HashMap<SentenceId, Vec<TokenRef>>> = sets.iter().map(|s| bucket_by_sentence(s)).collect();
    let sentences = shared_sentences(&buckets);
    log::debug!(
        "evaluating {} words with {} constraints over {} shared sentences",
        word_order.len(),
        links.len(),
        sentences.len()
    );

    let mut matches = Vec::new();
    for sentence_id in sentences {
        let sentence_buckets: Vec<&[TokenRef]> = buckets
            .iter()
            .map(|b| b.get(&sentence_id).map(Vec::as_slice).unwrap_or(&[]))
            .collect();

        let mut search = SentenceSearch {
            buckets: &sentence_buckets,
            links: &links,
            order: join_order(&sentence_buckets, &links),
            bound: vec![None; word_order.len()],
            out: &mut matches,
        };
        search.bind(0);
    }

    Ok(matches)
}

fn resolve_links(constraints: &[WordConstraint], word_order: &[String]) -> Result<Vec<Link>, SearchError> {
    let index_of = |name: &str| {
        word_order.iter().position(|w| w == name).ok_or_else(|| {
            SearchError::invalid_query(format!("constraint refers to unknown word '{}'", name))
        })
    };

    constraints
        .iter()
        .map(|c| {
            if let ConstraintKind::LinearDistance { min, max } = c.kind {
                if min > max {
                    return Err(SearchError::invalid_query(format!(
                        "linear_distance [{}, {}] on ({}, {}) has min greater than max",
                        min, max, c.first, c.second
                    )));
                }
            }
            Ok(Link {
                first: index_of(&c.first)?,
                second: index_of(&c.second)?,
                kind: c.kind,
            })
        })
        .collect()
}

/// Candidates grouped by sentence, each group sorted by position
fn bucket_by_sentence(set: &CandidateSet) -> HashMap<SentenceId, Vec<TokenRef>> {
    let mut buckets: HashMap<SentenceId, Vec<TokenRef>> = HashMap::new();
    for token in set {
        buckets.entry(token.sentence_id).or_default().push(*token);
    }
    for bucket in buckets.values_mut() {
        bucket.sort_unstable();
    }
    buckets
}

/// Sentences that have candidates for every word, ascending
fn shared_sentences(buckets: &[HashMap<SentenceId, Vec<TokenRef>>]) -> Vec<SentenceId> {
    let Some(smallest) = buckets.iter().min_by_key(|b| b.len()) else {
        return Vec::new();
    };
    let mut shared: Vec<SentenceId> = smallest
        .keys()
        .filter(|id| buckets.iter().all(|b| b.contains_key(id)))
        .copied()
        .collect();
    shared.sort_unstable();
    shared
}

/// Smallest bucket first, then words linked to already ordered ones
fn join_order(buckets: &[&[TokenRef]], links: &[Link]) -> Vec<usize> {
    let mut order = Vec::with_capacity(buckets.len());
    let mut placed = vec![false; buckets.len()];

    while order.len() < buckets.len() {
        let next = (0..buckets.len())
            .filter(|&w| !placed[w])
            .min_by_key(|&w| {
                let linked = links.iter().any(|l| {
                    (l.first == w && placed[l.second]) || (l.second == w && placed[l.first])
                });
                (!linked, buckets[w].len(), w)
            });
        match next {
            Some(w) => {
                placed[w] = true;
                order.push(w);
            }
            None => break,
        }
    }
    order
}

struct SentenceSearch<'a> {
    buckets: &'a [&'a [TokenRef]],
    links: &'a [Link],
    order: Vec<usize>,
    bound: Vec<Option<TokenRef>>,
    out: &'a mut Vec<MatchTuple>,
}

impl SentenceSearch<'_> {
    fn bind(&mut self, depth: usize) {
        if depth == self.order.len() {
            let tokens = self.bound.iter().flatten().copied().collect();
            self.out.push(MatchTuple::new(tokens));
            return;
        }

        let word = self.order[depth];
        let Some((lo, hi)) = self.window(word) else {
            return;
        };
        let bucket = self.buckets[word];
        let start = bucket.partition_point(|t| i64::from(t.position) < lo);
        let end = bucket.partition_point(|t| i64::from(t.position) <= hi);

        for token in &bucket[start..end.max(start)] {
            if !self.consistent(word, token) {
                continue;
            }
            self.bound[word] = Some(*token);
            self.bind(depth + 1);
        }
        self.bound[word] = None;
    }

    /// Position range allowed for `word` by its bound neighbours
    fn window(&self, word: usize) -> Option<(i64, i64)> {
        let mut lo = i64::MIN;
        let mut hi = i64::MAX;
        for link in self.links {
            let ConstraintKind::LinearDistance { min, max } = link.kind else {
                continue;
            };
            if link.second == word {
                if let Some(first) = self.bound[link.first] {
                    let anchor = i64::from(first.position);
                    lo = lo.max(anchor.saturating_add(min));
                    hi = hi.min(anchor.saturating_add(max));
                }
            } else if link.first == word {
                if let Some(second) = self.bound[link.second] {
                    let anchor = i64::from(second.position);
                    lo = lo.max(anchor.saturating_sub(max));
                    hi = hi.min(anchor.saturating_sub(min));
                }
            }
        }
        (lo <= hi).then_some((lo, hi))
    }

    /// Check every link between `word` and bound words, including self-links
    fn consistent(&self, word: usize, token: &TokenRef) -> bool {
        let token_of = |w: usize| if w == word { Some(*token) } else { self.bound[w] };
        self.links
            .iter()
            .filter(|l| l.first == word || l.second == word)
            .all(|l| match (token_of(l.first), token_of(l.second)) {
                (Some(first), Some(second)) => l.kind.accepts(&first, &second),
                _ => true,
            })
    }
}
