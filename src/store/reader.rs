//! Read primitives consumed by the search pipeline.
//!
//! The [`CorpusReader`] trait is the seam between the matcher/assembler and the
//! persistence engine; [`CorpusStore`] implements it on top of SQLite.

use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::SearchError;
use crate::query::LabelRef;
use crate::store::core::CorpusStore;
use crate::store::schema::TABLES;
use crate::types::{CandidateSet, SentenceId, TokenId, TokenRef};

/// A row of a lookup table (part-of-speech tag, gloss)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTranslation {
    pub lang: String,
    pub text: String,
}

/// A fully annotated token of a sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceToken {
    pub token_id: TokenId,
    pub position: u32,
    pub surface: String,
    pub translit: String,
    pub gloss_string: String,
    pub translations: Vec<TokenTranslation>,
}

/// Text of the neighbouring sentences in storage order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceContext {
    pub left: Option<String>,
    pub right: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceInfo {
    pub id: SentenceId,
    pub address: String,
    pub text: String,
    pub translation: Option<String>,
}

/// Row count per table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub tables: BTreeMap<String, i64>,
}

impl CorpusStats {
    pub fn count(&self, table: &str) -> i64 {
        self.tables.get(table).copied().unwrap_or(0)
    }
}

/// Read access to an annotated corpus
pub trait CorpusReader {
    /// Tokens whose stem transliteration (flat or syllable-delimited) equals `text`
    fn lookup_by_stem(&self, text: &str) -> Result<CandidateSet, SearchError>;

    /// Tokens tagged with the given part of speech
    fn lookup_by_pos(&self, pos: &LabelRef) -> Result<CandidateSet, SearchError>;

    /// Tokens whose gloss multiset contains every requested gloss.
    ///
    /// A gloss requested twice needs two distinct grammar slots.
    fn lookup_by_glosses(&self, glosses: &[LabelRef]) -> Result<CandidateSet, SearchError>;

    fn list_pos_tags(&self) -> Result<Vec<Label>, SearchError>;

    fn list_glosses(&self) -> Result<Vec<Label>, SearchError>;

    /// Text of sentences `id - 1` and `id + 1`; `None` past either end
    fn sentence_context(&self, sentence_id: SentenceId) -> Result<SentenceContext, SearchError>;

    /// Tokens of a sentence ordered by position
    fn sentence_tokens(&self, sentence_id: SentenceId) -> Result<Vec<SentenceToken>, SearchError>;

    fn sentence_info(&self, sentence_id: SentenceId) -> Result<Option<SentenceInfo>, SearchError>;

    fn corpus_stats(&self) -> Result<CorpusStats, SearchError>;
}

fn token_ref_from_row(row: &Row<'_>) -> rusqlite::Result<TokenRef> {
    Ok(TokenRef::new(row.get(0)?, row.get(1)?, row.get(2)?))
}

impl CorpusStore {
    fn gloss_id(&self, gloss: &LabelRef) -> Result<Option<i64>, SearchError> {
        match gloss {
            LabelRef::Id(id) => Ok(Some(*id)),
            LabelRef::Name(name) => Ok(self
                .conn
                .prepare_cached("SELECT id FROM gloss WHERE name = ?1")?
                .query_row(params![name], |row| row.get(0))
                .optional()?),
        }
    }

    fn list_labels(&self, table: &str) -> Result<Vec<Label>, SearchError> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("SELECT id, name FROM {} ORDER BY name", table))?;
        let labels = stmt
            .query_map([], |row| {
                Ok(Label {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(labels)
    }

    fn sentence_text(&self, sentence_id: SentenceId) -> Result<Option<String>, SearchError> {
        Ok(self
            .conn
            .prepare_cached("SELECT sent FROM sentence WHERE id = ?1")?
            .query_row(params![sentence_id], |row| row.get(0))
            .optional()?)
    }
}

impl CorpusReader for CorpusStore {
    fn lookup_by_stem(&self, text: &str) -> Result<CandidateSet, SearchError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT t.sent_id, t.pos_in_sent, t.id
             FROM token t JOIN stem s ON s.id = t.stem_id
             WHERE s.translit = ?1 OR s.translit_syl = ?1",
        )?;
        let found = stmt
            .query_map(params![text], token_ref_from_row)?
            .collect::<rusqlite::Result<CandidateSet>>()?;
        Ok(found)
    }

    fn lookup_by_pos(&self, pos: &LabelRef) -> Result<CandidateSet, SearchError> {
        let found = match pos {
            LabelRef::Id(id) => self
                .conn
                .prepare_cached("SELECT t.sent_id, t.pos_in_sent, t.id FROM token t WHERE t.pos_id = ?1")?
                .query_map(params![id], token_ref_from_row)?
                .collect::<rusqlite::Result<CandidateSet>>()?,
            LabelRef::Name(name) => self
                .conn
                .prepare_cached(
                    "SELECT t.sent_id, t.pos_in_sent, t.id
                     FROM token t JOIN pos p ON p.id = t.pos_id
                     WHERE p.name = ?1",
                )?
                .query_map(params![name], token_ref_from_row)?
                .collect::<rusqlite::Result<CandidateSet>>()?,
        };
        Ok(found)
    }

    fn lookup_by_glosses(&self, glosses: &[LabelRef]) -> Result<CandidateSet, SearchError> {
        // gloss id -> number of slots it has to fill
        let mut required: BTreeMap<i64, i64> = BTreeMap::new();
        for gloss in glosses {
            match self.gloss_id(gloss)? {
                Some(id) => *required.entry(id).or_insert(0) += 1,
                None => {
                    log::debug!("Unknown gloss '{}', no token can match", gloss);
                    return Ok(CandidateSet::new());
                }
            }
        }
        if required.is_empty() {
            return Ok(CandidateSet::new());
        }

        let placeholders = vec!["?"; required.len()].join(", ");
        let having = vec!["SUM(CASE WHEN a.gloss_id = ? THEN 1 ELSE 0 END) >= ?"; required.len()].join(" AND ");
        let sql = format!(
            "SELECT t.sent_id, t.pos_in_sent, t.id
             FROM token t
             JOIN grammar g ON g.token_id = t.id
             JOIN allomorph a ON a.id = g.allomorph_id
             WHERE a.gloss_id IN ({})
             GROUP BY t.id, t.sent_id, t.pos_in_sent
             HAVING {}",
            placeholders, having
        );

        let mut values: Vec<i64> = required.keys().copied().collect();
        for (id, count) in &required {
            values.push(*id);
            values.push(*count);
        }

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let found = stmt
            .query_map(params_from_iter(values.iter()), token_ref_from_row)?
            .collect::<rusqlite::Result<CandidateSet>>()?;
        Ok(found)
    }

    fn list_pos_tags(&self) -> Result<Vec<Label>, SearchError> {
        self.list_labels("pos")
    }

    fn list_glosses(&self) -> Result<Vec<Label>, SearchError> {
        self.list_labels("gloss")
    }

    fn sentence_context(&self, sentence_id: SentenceId) -> Result<SentenceContext, SearchError> {
        Ok(SentenceContext {
            left: self.sentence_text(sentence_id - 1)?,
            right: self.sentence_text(sentence_id + 1)?,
        })
    }

    fn sentence_tokens(&self, sentence_id: SentenceId) -> Result<Vec<SentenceToken>, SearchError> {
        let mut morphs: HashMap<TokenId, Vec<(String, String)>> = HashMap::new();
        let mut stmt = self.conn.prepare_cached(
            "SELECT g.token_id, a.translit, gl.name
             FROM grammar g
             JOIN token t ON t.id = g.token_id
             JOIN allomorph a ON a.id = g.allomorph_id
             JOIN gloss gl ON gl.id = a.gloss_id
             WHERE t.sent_id = ?1
             ORDER BY g.token_id, g.pos_in_suffix",
        )?;
        let rows = stmt.query_map(params![sentence_id], |row| {
            Ok((row.get::<_, TokenId>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })?;
        for row in rows {
            let (token_id, allomorph, gloss) = row?;
            morphs.entry(token_id).or_default().push((allomorph, gloss));
        }

        let mut translations: HashMap<TokenId, Vec<TokenTranslation>> = HashMap::new();
        let mut stmt = self.conn.prepare_cached(
            "SELECT tr.token_id, tr.lang, tr.transl
             FROM translation tr JOIN token t ON t.id = tr.token_id
             WHERE t.sent_id = ?1
             ORDER BY tr.id",
        )?;
        let rows = stmt.query_map(params![sentence_id], |row| {
            Ok((
                row.get::<_, TokenId>(0)?,
                TokenTranslation {
                    lang: row.get(1)?,
                    text: row.get(2)?,
                },
            ))
        })?;
        for row in rows {
            let (token_id, translation) = row?;
            translations.entry(token_id).or_default().push(translation);
        }

        let mut stmt = self.conn.prepare_cached(
            "SELECT t.id, t.pos_in_sent, t.surface, s.translit_syl
             FROM token t LEFT JOIN stem s ON s.id = t.stem_id
             WHERE t.sent_id = ?1
             ORDER BY t.pos_in_sent",
        )?;
        let rows = stmt.query_map(params![sentence_id], |row| {
            Ok((
                row.get::<_, TokenId>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut tokens = Vec::new();
        for row in rows {
            let (token_id, position, surface, stem) = row?;
            let grammar = morphs.remove(&token_id).unwrap_or_default();

            let mut translit = stem.unwrap_or_default();
            for (allomorph, _) in &grammar {
                if !translit.is_empty() {
                    translit.push('=');
                }
                translit.push_str(allomorph);
            }
            let gloss_string = grammar
                .iter()
                .map(|(_, gloss)| gloss.as_str())
                .collect::<Vec<_>>()
                .join("+");

            tokens.push(SentenceToken {
                token_id,
                position,
                surface,
                translit,
                gloss_string,
                translations: translations.remove(&token_id).unwrap_or_default(),
            });
        }
        Ok(tokens)
    }

    fn sentence_info(&self, sentence_id: SentenceId) -> Result<Option<SentenceInfo>, SearchError> {
        Ok(self
            .conn
            .prepare_cached("SELECT id, sent_address, sent, translation FROM sentence WHERE id = ?1")?
            .query_row(params![sentence_id], |row| {
                Ok(SentenceInfo {
                    id: row.get(0)?,
                    address: row.get(1)?,
                    text: row.get(2)?,
                    translation: row.get(3)?,
                })
            })
            .optional()?)
    }

    fn corpus_stats(&self) -> Result<CorpusStats, SearchError> {
        let mut stats = CorpusStats::default();
        for table in TABLES {
            let count: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            stats.tables.insert(table.to_string(), count);
        }
        Ok(stats)
    }
}
