//! Document registry endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::response::DocumentSummary;

/// GET /api/documents - List all ingested documents
pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentSummary>>> {
    let documents = state.store().documents()?;
    Ok(Json(documents.iter().map(DocumentSummary::from).collect()))
}

/// GET /api/documents/:id - Get document details
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentSummary>> {
    let doc = state
        .store()
        .get_document(&id)?
        .ok_or_else(|| Error::DocumentNotFound(id.to_string()))?;
    Ok(Json(DocumentSummary::from(&doc)))
}

/// DELETE /api/documents/:id - Delete a document and its chunks
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    if state.store().get_document(&id)?.is_none() {
        return Err(Error::DocumentNotFound(id.to_string()));
    }

    let deleted = state.store().delete_document(&id)?;
    tracing::info!("Deleted document {} ({} chunks)", id, deleted);

    Ok(Json(json!({
        "deleted": true,
        "chunks_removed": deleted,
    })))
}

/// DELETE /api/documents - Clear the whole collection
pub async fn clear_documents(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    state.store().clear()?;
    tracing::info!("Cleared document collection");
    Ok(Json(json!({ "cleared": true })))
}
