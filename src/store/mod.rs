//! SQLite corpus store
//!
//! - `schema`: DDL and table list
//! - `core`: `CorpusStore` handle and constructors
//! - `reader`: `CorpusReader` trait and the read primitives used by search
//! - `writer`: upserts and transactional sentence insertion

pub mod core;
pub mod reader;
pub mod schema;
pub mod writer;

pub use self::core::CorpusStore;
pub use reader::{
    CorpusReader, CorpusStats, Label, SentenceContext, SentenceInfo, SentenceToken, TokenTranslation,
};
