//! API routes for the assistant server

pub mod documents;
pub mod ingest;
pub mod patients;
pub mod query;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Document management
        .route("/documents", get(documents::list_documents))
        .route("/documents/:id", get(documents::get_document))
        .route("/documents/:id", delete(documents::delete_document))
        .route("/documents", delete(documents::clear_documents))
        // Ingestion - with larger body limit for file uploads
        .route(
            "/ingest",
            post(ingest::ingest_files).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Query and consult
        .route("/query", post(query::query_assistant))
        .route("/consult", post(query::consult))
        // Patient registry
        .route("/patients", get(patients::list_patients))
        .route("/patients", post(patients::add_patient))
        .route("/patients/:id", get(patients::get_patient))
        .route("/patients/:id", put(patients::update_patient))
        .route("/patients/:id", delete(patients::delete_patient))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "medirag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Retrieval-augmented medical dosage assistant",
        "endpoints": {
            "POST /api/ingest": "Upload and process documents",
            "POST /api/query": "Ask a question with citations",
            "POST /api/consult": "Ask about a registered patient",
            "GET /api/documents": "List ingested documents",
            "GET /api/documents/:id": "Get document details",
            "DELETE /api/documents/:id": "Delete a document",
            "DELETE /api/documents": "Clear the collection",
            "GET /api/patients": "List patients",
            "POST /api/patients": "Add a patient",
            "GET /api/patients/:id": "Get a patient",
            "PUT /api/patients/:id": "Update a patient",
            "DELETE /api/patients/:id": "Delete a patient"
        }
    }))
}
