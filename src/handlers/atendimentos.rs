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
    models::atendimento::{Atendimento, AtendimentoInput},
    repositories::atendimento as atendimento_repo,
    state::AppState,
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub diagnostico_id: Option<Uuid>,
}

/// Lists atendimentos, optionally for one diagnóstico.
#[axum::debug_handler]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Atendimento>>> {
    Ok(Json(
        atendimento_repo::list(&state.db, query.diagnostico_id.as_ref()).await?,
    ))
}

/// Creates an atendimento.
#[axum::debug_handler]
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<AtendimentoInput>,
) -> Result<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let atendimento = atendimento_repo::create(&state.db, &payload).await?;
    tracing::info!("🏥 Atendimento criado: {}", atendimento.id);
    Ok((StatusCode::CREATED, Json(atendimento)))
}

/// Fetches one atendimento, attachments included.
#[axum::debug_handler]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Atendimento>> {
    atendimento_repo::get(&state.db, &id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Updates an atendimento.
#[axum::debug_handler]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AtendimentoInput>,
) -> Result<Json<Atendimento>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    atendimento_repo::update(&state.db, &id, &payload)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Deletes an atendimento.
#[axum::debug_handler]
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    if !atendimento_repo::delete(&state.db, &id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!("🗑️ Atendimento removido: {}", id);
    Ok(StatusCode::NO_CONTENT)
}
