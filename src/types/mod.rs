pub mod token_ref;

pub use token_ref::{CandidateSet, MatchTuple, SentenceId, TokenId, TokenRef};
