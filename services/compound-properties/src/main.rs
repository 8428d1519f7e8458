//! ChemTable Compound Properties Service
//!
//! Aggregates chemical-property observations from PubChem and Wikidata into
//! a single ranked, deduplicated view per compound, and serves the compound
//! table over HTTP.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

mod cache;
mod ghs;
mod provider;
mod pubchem;
mod service;
mod wikidata;

use chemtable_models::Compound;
use chemtable_utils::{init_logging, AppConfig, ChemTableError};
use service::CompoundService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|_| {
        eprintln!("Failed to load configuration, using defaults");
        AppConfig::default()
    });

    // Initialize logging
    init_logging(&config.logging)?;
    info!("Starting ChemTable Compound Properties Service");

    // Initialize service
    let service = CompoundService::new(&config);

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/suggestions/:query", get(get_suggestions))
        .route(
            "/api/v1/compounds",
            get(list_compounds)
                .post(lookup_compound)
                .delete(clear_compounds),
        )
        .route(
            "/api/v1/compounds/:cid",
            get(get_compound).delete(delete_compound),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers(Any),
        )
        .with_state(service);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(&addr).await?;
    info!("Compound Properties Service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "compound-properties",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Autocomplete suggestions for a partial compound name
#[derive(Debug, Serialize)]
struct SuggestionsResponse {
    query: String,
    suggestions: Vec<String>,
}

async fn get_suggestions(
    State(service): State<CompoundService>,
    Path(query): Path<String>,
) -> Result<Json<SuggestionsResponse>, (StatusCode, String)> {
    let suggestions = service
        .suggestions(&query)
        .await
        .map_err(into_response_error)?;

    Ok(Json(SuggestionsResponse { query, suggestions }))
}

/// Look up a compound by name and add it to the table
#[derive(Debug, Deserialize)]
struct LookupRequest {
    name: String,
}

async fn lookup_compound(
    State(service): State<CompoundService>,
    Json(request): Json<LookupRequest>,
) -> Result<Json<Compound>, (StatusCode, String)> {
    let compound = service
        .lookup(&request.name)
        .await
        .map_err(into_response_error)?;

    Ok(Json(compound))
}

/// The current compound table
#[derive(Debug, Serialize)]
struct TableResponse {
    compounds: Vec<Compound>,
    total: usize,
}

async fn list_compounds(State(service): State<CompoundService>) -> Json<TableResponse> {
    let compounds = service.list().await;
    let total = compounds.len();

    Json(TableResponse { compounds, total })
}

async fn get_compound(
    State(service): State<CompoundService>,
    Path(cid): Path<String>,
) -> Result<Json<Compound>, (StatusCode, String)> {
    service
        .get(&cid)
        .await
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("Compound {} not in table", cid)))
}

async fn delete_compound(
    State(service): State<CompoundService>,
    Path(cid): Path<String>,
) -> StatusCode {
    if service.remove(&cid).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Clear the compound table
#[derive(Debug, Serialize)]
struct ClearResponse {
    cleared: usize,
}

async fn clear_compounds(State(service): State<CompoundService>) -> Json<ClearResponse> {
    let cleared = service.clear().await;
    Json(ClearResponse { cleared })
}

fn into_response_error(err: ChemTableError) -> (StatusCode, String) {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}
