use anyhow::Result;
use clap::Parser;
use mkcorpus::engine::DEFAULT_MAX_QUERY_WORDS;
use mkcorpus::{start_server, ApiConfig};

#[derive(Parser)]
#[command(name = "mkcorpus-api")]
#[command(about = "Middle Korean Corpus Search API Server")]
struct Args {
    /// Host to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind the server to
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Path to the corpus database
    #[arg(long, default_value = "corpus.db")]
    db: String,

    /// Maximum number of words in one query
    #[arg(long, default_value_t = DEFAULT_MAX_QUERY_WORDS)]
    max_query_words: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    log::info!("Starting corpus API server...");
    log::info!(
        "Configuration: host={}, port={}, db={}, max_query_words={}",
        args.host,
        args.port,
        args.db,
        args.max_query_words
    );

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        db_path: args.db,
        max_query_words: args.max_query_words,
    };

    start_server(config).await?;

    Ok(())
}
