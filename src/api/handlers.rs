use actix_web::{web, HttpResponse, Result};

use crate::api::models::{ErrorResponse, HealthResponse, LabelResponse, SearchResponse, StatsResponse};
use crate::engine::SearchEngine;
use crate::error::SearchError;
use crate::query::Query;
use crate::store::{CorpusReader, CorpusStore};

/// Engine owned by one server worker
pub type CorpusEngine = SearchEngine<CorpusStore>;

/// Health check endpoint
pub async fn health_check() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "Middle Korean Corpus API".to_string(),
    }))
}

/// Search endpoint; the body is the JSON query document
pub async fn search(engine: web::Data<CorpusEngine>, body: String) -> Result<HttpResponse> {
    let query = match Query::from_json(&body) {
        Ok(query) => query,
        Err(e) => return Ok(error_response(&e)),
    };

    match engine.search(&query) {
        Ok(result) => Ok(HttpResponse::Ok().json(SearchResponse::new(query.word_order(), result))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// List part-of-speech tags
pub async fn list_pos(engine: web::Data<CorpusEngine>) -> Result<HttpResponse> {
    match engine.pos_tags() {
        Ok(labels) => Ok(HttpResponse::Ok().json(
            labels.into_iter().map(LabelResponse::from).collect::<Vec<_>>(),
        )),
        Err(e) => Ok(error_response(&e)),
    }
}

/// List glosses
pub async fn list_glosses(engine: web::Data<CorpusEngine>) -> Result<HttpResponse> {
    match engine.glosses() {
        Ok(labels) => Ok(HttpResponse::Ok().json(
            labels.into_iter().map(LabelResponse::from).collect::<Vec<_>>(),
        )),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Get corpus statistics
pub async fn corpus_stats(engine: web::Data<CorpusEngine>) -> Result<HttpResponse> {
    match engine.reader().corpus_stats() {
        Ok(stats) => Ok(HttpResponse::Ok().json(StatsResponse::from(stats))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// 400 for request errors, 500 for everything else
fn error_response(error: &SearchError) -> HttpResponse {
    if error.is_client_error() {
        log::debug!("Rejected query: {}", error);
        HttpResponse::BadRequest().json(ErrorResponse::from(error))
    } else {
        log::error!("Query execution failed: {}", error);
        HttpResponse::InternalServerError().json(ErrorResponse::from(error))
    }
}
