//! Write path of the corpus store.
//!
//! Lookup rows (text, pos, gloss, allomorph, stem) are written with single
//! `INSERT .. ON CONFLICT .. DO UPDATE .. RETURNING id` statements: the
//! statement inserts the row when its natural key is new and otherwise returns
//! the id of the existing row. Sentences are written one transaction each.

use rusqlite::{params, Connection, ErrorCode, TransactionBehavior};

use crate::data::record::{AnnotationRecord, SentenceUnit, StemForm};
use crate::error::SearchError;
use crate::store::core::CorpusStore;
use crate::types::{SentenceId, TokenId};

pub(crate) fn upsert_text(conn: &Connection, title: &str) -> rusqlite::Result<i64> {
    conn.prepare_cached(
        "INSERT INTO text (title) VALUES (?1)
         ON CONFLICT(title) DO UPDATE SET title = excluded.title
         RETURNING id",
    )?
    .query_row(params![title], |row| row.get(0))
}

pub(crate) fn upsert_pos(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
    conn.prepare_cached(
        "INSERT INTO pos (name) VALUES (?1)
         ON CONFLICT(name) DO UPDATE SET name = excluded.name
         RETURNING id",
    )?
    .query_row(params![name], |row| row.get(0))
}

pub(crate) fn upsert_gloss(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
    conn.prepare_cached(
        "INSERT INTO gloss (name) VALUES (?1)
         ON CONFLICT(name) DO UPDATE SET name = excluded.name
         RETURNING id",
    )?
    .query_row(params![name], |row| row.get(0))
}

pub(crate) fn upsert_allomorph(conn: &Connection, translit: &str, gloss_id: i64) -> rusqlite::Result<i64> {
    conn.prepare_cached(
        "INSERT INTO allomorph (translit, gloss_id) VALUES (?1, ?2)
         ON CONFLICT(gloss_id, translit) DO UPDATE SET translit = excluded.translit
         RETURNING id",
    )?
    .query_row(params![translit, gloss_id], |row| row.get(0))
}

pub(crate) fn upsert_stem(conn: &Connection, stem: &StemForm) -> rusqlite::Result<i64> {
    conn.prepare_cached(
        "INSERT INTO stem (translit, translit_syl) VALUES (?1, ?2)
         ON CONFLICT(translit_syl) DO UPDATE SET translit = excluded.translit
         RETURNING id",
    )?
    .query_row(params![stem.translit, stem.translit_syl], |row| row.get(0))
}

fn insert_sentence_row(conn: &Connection, text_id: i64, unit: &SentenceUnit) -> rusqlite::Result<SentenceId> {
    conn.prepare_cached(
        "INSERT INTO sentence (text_id, sent_address, sent, translation)
         VALUES (?1, ?2, ?3, ?4)
         RETURNING id",
    )?
    .query_row(
        params![text_id, unit.address, unit.text(), unit.translation],
        |row| row.get(0),
    )
}

fn insert_token(conn: &Connection, sentence_id: SentenceId, record: &AnnotationRecord) -> rusqlite::Result<TokenId> {
    let pos_id = match &record.part_of_speech {
        Some(pos) => Some(upsert_pos(conn, pos)?),
        None => None,
    };
    let stem_id = match &record.stem {
        Some(stem) => Some(upsert_stem(conn, stem)?),
        None => None,
    };

    let token_id: TokenId = conn
        .prepare_cached(
            "INSERT INTO token (sent_id, pos_in_sent, surface, pos_id, stem_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
        )?
        .query_row(
            params![sentence_id, record.position, record.surface, pos_id, stem_id],
            |row| row.get(0),
        )?;

    for translation in &record.translations {
        conn.prepare_cached("INSERT INTO translation (token_id, lang, transl) VALUES (?1, ?2, ?3)")?
            .execute(params![token_id, translation.lang, translation.text])?;
    }

    for (slot, morph) in record.grammar.iter().enumerate() {
        let gloss_id = upsert_gloss(conn, &morph.gloss)?;
        let allomorph_id = upsert_allomorph(conn, &morph.translit, gloss_id)?;
        conn.prepare_cached("INSERT INTO grammar (token_id, pos_in_suffix, allomorph_id) VALUES (?1, ?2, ?3)")?
            .execute(params![token_id, slot as i64, allomorph_id])?;
    }

    Ok(token_id)
}

/// Unique-key violations become `CorpusIntegrity`, everything else stays a store error
fn classify(err: rusqlite::Error, address: &str) -> SearchError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message) if failure.code == ErrorCode::ConstraintViolation => {
            SearchError::CorpusIntegrity {
                address: address.to_string(),
                reason: message.clone().unwrap_or_else(|| failure.to_string()),
            }
        }
        _ => SearchError::Store(err),
    }
}

impl CorpusStore {
    /// Id of the text with this title, created if absent
    pub fn upsert_text(&mut self, title: &str) -> Result<i64, SearchError> {
        if self.read_only {
            return Err(SearchError::ReadOnly);
        }
        Ok(upsert_text(&self.conn, title)?)
    }

    /// Insert one sentence and all of its tokens atomically.
    ///
    /// On any error the transaction is rolled back and nothing of the unit is
    /// visible to readers.
    pub fn insert_sentence(&mut self, text_id: i64, unit: &SentenceUnit) -> Result<SentenceId, SearchError> {
        if self.read_only {
            return Err(SearchError::ReadOnly);
        }
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let sentence_id = insert_sentence_row(&tx, text_id, unit).map_err(|e| classify(e, &unit.address))?;
        for record in &unit.tokens {
            insert_token(&tx, sentence_id, record).map_err(|e| classify(e, &unit.address))?;
        }

        tx.commit()?;
        log::debug!(
            "Inserted sentence '{}' as #{} ({} tokens)",
            unit.address,
            sentence_id,
            unit.tokens.len()
        );
        Ok(sentence_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CorpusReader;

    fn unit(address: &str) -> SentenceUnit {
        let mut unit = SentenceUnit::new(address);
        unit.push(
            AnnotationRecord::new(address, 0, "A")
                .with_pos("N")
                .with_stem("na-la")
                .with_morph("s", "GEN"),
        );
        unit.push(
            AnnotationRecord::new(address, 0, "B")
                .with_pos("V")
                .with_stem("ho")
                .with_morph("ni", "TOP")
                .with_morph("ta", "IND")
                .with_translation("en", "do"),
        );
        unit
    }

    #[test]
    fn test_upserts_reuse_existing_rows() {
        let store = CorpusStore::open_in_memory().unwrap();
        let conn = store.connection();
        let first = upsert_pos(conn, "N").unwrap();
        assert_eq!(upsert_pos(conn, "N").unwrap(), first);
        assert_ne!(upsert_pos(conn, "V").unwrap(), first);

        let gloss = upsert_gloss(conn, "TOP").unwrap();
        let allomorph = upsert_allomorph(conn, "nʌn", gloss).unwrap();
        assert_eq!(upsert_allomorph(conn, "nʌn", gloss).unwrap(), allomorph);
        assert_ne!(upsert_allomorph(conn, "ɨn", gloss).unwrap(), allomorph);

        let stem = StemForm::from_syllables("ho-ta", "-");
        let stem_id = upsert_stem(conn, &stem).unwrap();
        assert_eq!(upsert_stem(conn, &stem).unwrap(), stem_id);
    }

    #[test]
    fn test_insert_sentence_writes_all_rows() {
        let mut store = CorpusStore::open_in_memory().unwrap();
        let text_id = store.upsert_text("sample.tsv").unwrap();
        let sentence_id = store.insert_sentence(text_id, &unit("1a")).unwrap();

        let stats = store.corpus_stats().unwrap();
        assert_eq!(stats.count("sentence"), 1);
        assert_eq!(stats.count("token"), 2);
        assert_eq!(stats.count("grammar"), 3);
        assert_eq!(stats.count("translation"), 1);
        assert_eq!(stats.count("pos"), 2);

        let info = store.sentence_info(sentence_id).unwrap().unwrap();
        assert_eq!(info.address, "1a");
        assert_eq!(info.text, "A B");
    }

    #[test]
    fn test_duplicate_sentence_is_rejected_and_rolled_back() {
        let mut store = CorpusStore::open_in_memory().unwrap();
        let text_id = store.upsert_text("sample.tsv").unwrap();
        store.insert_sentence(text_id, &unit("1a")).unwrap();

        let err = store.insert_sentence(text_id, &unit("1a")).unwrap_err();
        assert!(matches!(err, SearchError::CorpusIntegrity { ref address, .. } if address == "1a"));
        assert_eq!(store.corpus_stats().unwrap().count("token"), 2);
    }

    #[test]
    fn test_duplicate_position_rolls_back_whole_unit() {
        let mut store = CorpusStore::open_in_memory().unwrap();
        let text_id = store.upsert_text("sample.tsv").unwrap();

        let mut broken = unit("2b");
        broken.tokens[1].position = 0;
        let err = store.insert_sentence(text_id, &broken).unwrap_err();
        assert!(matches!(err, SearchError::CorpusIntegrity { .. }));

        let stats = store.corpus_stats().unwrap();
        assert_eq!(stats.count("sentence"), 0);
        assert_eq!(stats.count("token"), 0);
    }
}
