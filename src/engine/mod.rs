//! Search engine over an annotated corpus
//!
//! This module is organized into the following submodules:
//! - `config`: Search limits (SearchConfig)
//! - `candidate`: Per-word candidate matching against the store
//! - `evaluator`: Pairwise constraint evaluation over candidate sets
//! - `assembler`: Grouping of match tuples into annotated sentences
//! - `core`: Core SearchEngine struct and constructor
//! - `execution`: Query execution methods (match, search, label listings)

pub mod assembler;
pub mod candidate;
pub mod config;
pub mod core;
pub mod evaluator;
pub mod execution;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use assembler::{assemble, AnnotatedToken, SentenceGroup, TokenMark};
pub use candidate::{match_word, match_words};
pub use config::{SearchConfig, DEFAULT_MAX_QUERY_WORDS};
pub use self::core::SearchEngine;
pub use evaluator::evaluate;
