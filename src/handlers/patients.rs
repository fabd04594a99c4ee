use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use garde::Validate;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::patient::{Patient, PatientInput},
    repositories::patient as patient_repo,
    state::AppState,
};

/// Lists all patients.
#[axum::debug_handler]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Patient>>> {
    Ok(Json(patient_repo::list(&state.db).await?))
}

/// Creates a patient.
#[axum::debug_handler]
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<PatientInput>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let patient = patient_repo::create(&state.db, &payload).await?;
    tracing::info!("✅ Paciente criado: {}", patient.id);
    Ok((StatusCode::CREATED, Json(patient)))
}

/// Fetches one patient.
#[axum::debug_handler]
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Patient>> {
    patient_repo::get(&state.db, &id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Updates a patient.
#[axum::debug_handler]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PatientInput>,
) -> Result<Json<Patient>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    patient_repo::update(&state.db, &id, &payload)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Deletes a patient and, through the schema cascade, its history.
#[axum::debug_handler]
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    if !patient_repo::delete(&state.db, &id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!("🗑️ Paciente removido: {}", id);
    Ok(StatusCode::NO_CONTENT)
}
