//! Document ingestion endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::time::Instant;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::store::IngestOutcome;
use crate::types::response::{DocumentSummary, IngestError, IngestResponse};

/// POST /api/ingest - Upload and process files
pub async fn ingest_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>> {
    let start = Instant::now();
    let mut documents = Vec::new();
    let mut errors = Vec::new();
    let mut total_chunks = 0u32;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Internal(format!("Failed to read multipart field: {}", e)))?
    {
        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("file_{}.bin", Uuid::new_v4()));

        let data = match field.bytes().await {
            Ok(d) => d,
            Err(e) => {
                errors.push(IngestError {
                    filename,
                    error: format!("Failed to read file: {}", e),
                });
                continue;
            }
        };

        tracing::info!("Processing file: {} ({} bytes)", filename, data.len());

        match state.store().ingest_bytes(&filename, &data).await {
            Ok(IngestOutcome::New(doc)) | Ok(IngestOutcome::Replaced(doc, _)) => {
                total_chunks += doc.total_chunks;
                documents.push(DocumentSummary::from(&doc));
            }
            Ok(IngestOutcome::Skipped(reason)) => {
                tracing::info!("Skipped file: {} ({})", filename, reason);
            }
            Err(e) => {
                tracing::error!("Failed to process {}: {}", filename, e);
                errors.push(IngestError {
                    filename,
                    error: e.to_string(),
                });
            }
        }
    }

    let processing_time_ms = start.elapsed().as_millis() as u64;

    Ok(Json(IngestResponse {
        success: !documents.is_empty(),
        documents,
        total_chunks_created: total_chunks,
        processing_time_ms,
        errors,
    }))
}
