pub mod error;
pub mod types;
pub mod query;
pub mod store;
pub mod data;
pub mod engine;
pub mod results;
pub mod api;

pub use error::SearchError;
pub use types::{CandidateSet, MatchTuple, SentenceId, TokenId, TokenRef};
pub use query::{ConstraintKind, LabelRef, Query, QueryWord, WordConstraint};
pub use store::{CorpusReader, CorpusStore};
pub use data::{AnnotationParser, ColumnConfig, CorpusLoader, LoadReport};
pub use engine::{SearchConfig, SearchEngine};
pub use results::SearchResult;
pub use api::start_server;
pub use api::server::ApiConfig;
