pub mod config;
pub mod loader;
pub mod parser;
pub mod record;

pub use config::{ColumnConfig, TranslationColumn};
pub use loader::{CorpusLoader, LoadReport};
pub use parser::AnnotationParser;
pub use record::{AnnotationRecord, Morph, SentenceUnit, StemForm};
