use anyhow::{Context, Result};
use clap::Parser;
use mkcorpus::engine::{SearchConfig, SearchEngine, DEFAULT_MAX_QUERY_WORDS};
use mkcorpus::query::Query;
use mkcorpus::store::CorpusStore;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "mkcorpus")]
#[command(about = "Run a multi-word query against a Middle Korean corpus database")]
struct Args {
    /// Path to the corpus database
    #[arg(long, default_value = "corpus.db")]
    db: PathBuf,

    /// Query JSON, inline or as a path to a file
    #[arg(short, long)]
    query: String,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Maximum number of words in one query
    #[arg(long, default_value_t = DEFAULT_MAX_QUERY_WORDS)]
    max_query_words: usize,
}

fn read_query(arg: &str) -> Result<String> {
    let path = Path::new(arg);
    if !arg.trim_start().starts_with('{') && path.is_file() {
        return fs::read_to_string(path).with_context(|| format!("Failed to read query file {}", path.display()));
    }
    Ok(arg.to_string())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store = CorpusStore::open_read_only(&args.db)
        .with_context(|| format!("Failed to open corpus database {}", args.db.display()))?;
    let engine = SearchEngine::new(
        store,
        SearchConfig {
            max_query_words: args.max_query_words,
        },
    );

    let query = Query::from_json(&read_query(&args.query)?)?;
    let result = engine.search(&query)?;

    if args.json {
        println!("{}", result.to_json_pretty());
    } else {
        print!("{}", result.summary());
    }
    Ok(())
}
