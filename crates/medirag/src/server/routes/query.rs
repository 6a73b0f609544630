//! Query and consult endpoints

use axum::{extract::State, Json};
use pulldown_cmark::{html, Options, Parser};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{
    query::{ConsultRequest, QueryRequest},
    response::{ConsultResponse, QueryResponse},
};

/// POST /api/query - Ask the assistant a question
pub async fn query_assistant(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let start = Instant::now();

    if request.question.trim().is_empty() {
        return Err(Error::Config("question must not be empty".to_string()));
    }

    tracing::info!("Query: \"{}\"", request.question);

    let patient_info = request.patient_info.unwrap_or_default();
    let reply = state.agent().invoke(&request.question, &patient_info).await?;

    let processing_time_ms = start.elapsed().as_millis() as u64;
    let response = QueryResponse::new(reply.answer, reply.citations, processing_time_ms);

    tracing::info!(
        "Query completed in {}ms, {} citations",
        processing_time_ms,
        response.citations.len()
    );

    Ok(Json(response))
}

/// POST /api/consult - Ask about a registered patient
pub async fn consult(
    State(state): State<AppState>,
    Json(request): Json<ConsultRequest>,
) -> Result<Json<ConsultResponse>> {
    let start = Instant::now();

    if request.question.trim().is_empty() {
        return Err(Error::Config("question must not be empty".to_string()));
    }

    // Pull the patient record when an ID was supplied
    let patient = match &request.patient_id {
        Some(id) => Some(
            state
                .patients()
                .get(id)?
                .ok_or_else(|| Error::PatientNotFound(id.clone()))?,
        ),
        None => None,
    };

    let mut patient_info = patient
        .as_ref()
        .map(|p| p.to_context_block())
        .unwrap_or_default();
    if let Some(notes) = &request.notes {
        if !notes.trim().is_empty() {
            if !patient_info.is_empty() {
                patient_info.push('\n');
            }
            patient_info.push_str(&format!("Clinical notes: {}", notes.trim()));
        }
    }

    tracing::info!(
        "Consult: \"{}\" (patient: {})",
        request.question,
        request.patient_id.as_deref().unwrap_or("-")
    );

    let reply = state.agent().invoke(&request.question, &patient_info).await?;
    let answer_html = markdown_to_html(&reply.answer);

    let processing_time_ms = start.elapsed().as_millis() as u64;

    Ok(Json(ConsultResponse {
        answer: reply.answer,
        answer_html,
        citations: reply.citations,
        patient,
        processing_time_ms,
    }))
}

/// Render a markdown answer to HTML for direct display in the front end
fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_renders_to_html() {
        let html = markdown_to_html("# Dosing\n\n- metformin **500mg**\n");
        assert!(html.contains("<h1>"));
        assert!(html.contains("<li>"));
        assert!(html.contains("<strong>500mg</strong>"));
    }
}
