//! Patient registry endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::Patient;

/// GET /api/patients - List all patients
pub async fn list_patients(State(state): State<AppState>) -> Result<Json<Vec<Patient>>> {
    Ok(Json(state.patients().list()?))
}

/// POST /api/patients - Add a patient
pub async fn add_patient(
    State(state): State<AppState>,
    Json(patient): Json<Patient>,
) -> Result<Json<Patient>> {
    if patient.patient_id.trim().is_empty() {
        return Err(Error::Config("patient_id must not be empty".to_string()));
    }
    if state.patients().get(&patient.patient_id)?.is_some() {
        return Err(Error::Config(format!(
            "patient '{}' already exists",
            patient.patient_id
        )));
    }

    state.patients().insert(&patient)?;
    let stored = state
        .patients()
        .get(&patient.patient_id)?
        .ok_or_else(|| Error::internal("patient vanished after insert"))?;
    Ok(Json(stored))
}

/// GET /api/patients/:id - Get a patient
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Patient>> {
    let patient = state
        .patients()
        .get(&id)?
        .ok_or_else(|| Error::PatientNotFound(id))?;
    Ok(Json(patient))
}

/// PUT /api/patients/:id - Update a patient
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut patient): Json<Patient>,
) -> Result<Json<Patient>> {
    patient.patient_id = id.clone();
    state.patients().update(&patient)?;
    let stored = state
        .patients()
        .get(&id)?
        .ok_or_else(|| Error::PatientNotFound(id))?;
    Ok(Json(stored))
}

/// DELETE /api/patients/:id - Delete a patient
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state.patients().delete(&id)?;
    Ok(Json(json!({ "deleted": true })))
}
