use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use garde::Validate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::diagnostico::{Diagnostico, DiagnosticoInput},
    repositories::diagnostico as diagnostico_repo,
    state::AppState,
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub patient_id: Option<Uuid>,
}

/// Lists diagnósticos, optionally for one patient.
#[axum::debug_handler]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Diagnostico>>> {
    Ok(Json(
        diagnostico_repo::list(&state.db, query.patient_id.as_ref()).await?,
    ))
}

/// Creates a diagnóstico.
#[axum::debug_handler]
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<DiagnosticoInput>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let diagnostico = diagnostico_repo::create(&state.db, &payload).await?;
    tracing::info!("✅ Diagnóstico criado: {}", diagnostico.id);
    Ok((StatusCode::CREATED, Json(diagnostico)))
}

/// Fetches one diagnóstico.
#[axum::debug_handler]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Diagnostico>> {
    diagnostico_repo::get(&state.db, &id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Updates a diagnóstico.
#[axum::debug_handler]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DiagnosticoInput>,
) -> Result<Json<Diagnostico>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    diagnostico_repo::update(&state.db, &id, &payload)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Deletes a diagnóstico and its atendimentos.
#[axum::debug_handler]
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    if !diagnostico_repo::delete(&state.db, &id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!("🗑️ Diagnóstico removido: {}", id);
    Ok(StatusCode::NO_CONTENT)
}
