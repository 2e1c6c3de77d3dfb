use actix_web::{middleware, web, App, HttpServer};
use anyhow::Result;

use crate::api::handlers::{corpus_stats, health_check, list_glosses, list_pos, search};
use crate::engine::{SearchConfig, SearchEngine, DEFAULT_MAX_QUERY_WORDS};
use crate::store::CorpusStore;

/// Configuration for the API server
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub max_query_words: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            db_path: "corpus.db".to_string(),
            max_query_words: DEFAULT_MAX_QUERY_WORDS,
        }
    }
}

/// Routes under `/api/v1`
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .route("/search", web::post().to(search))
            .route("/pos", web::get().to(list_pos))
            .route("/glosses", web::get().to(list_glosses))
            .route("/stats", web::get().to(corpus_stats)),
    );
}

/// Start the API server.
///
/// The database is opened once read-write to create the schema and switch it
/// to WAL mode; every worker then opens its own read-only connection.
pub async fn start_server(config: ApiConfig) -> Result<()> {
    drop(CorpusStore::open(&config.db_path)?);

    log::info!("Starting corpus API server on {}:{}", config.host, config.port);
    log::info!("Database path: {}", config.db_path);

    let db_path = config.db_path.clone();
    let search_config = SearchConfig {
        max_query_words: config.max_query_words,
    };

    HttpServer::new(move || {
        let db_path = db_path.clone();
        let search_config = search_config.clone();
        App::new()
            .wrap(middleware::Logger::default())
            .data_factory(move || {
                let db_path = db_path.clone();
                let search_config = search_config.clone();
                async move {
                    CorpusStore::open_read_only(&db_path).map(|store| SearchEngine::new(store, search_config))
                }
            })
            .configure(configure_routes)
    })
    .bind(format!("{}:{}", config.host, config.port))?
    .run()
    .await?;

    Ok(())
}
