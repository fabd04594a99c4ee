use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{atendimento::Atendimento, diagnostico::Diagnostico, patient::Patient},
    repositories::{atendimento as atendimento_repo, diagnostico as diagnostico_repo, patient as patient_repo},
    state::AppState,
};

/// Metadata about the token that granted access, echoed to the share page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub expires_at: i64,
    pub created_at: i64,
}

/// The read-only slice of one patient's history served to a share link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedRecord {
    pub patient: Patient,
    pub diagnosticos: Vec<Diagnostico>,
    pub atendimentos: Vec<Atendimento>,
    pub token_info: TokenInfo,
}

/// Validates a share token + password pair and loads the scoped record.
///
/// Every authentication failure collapses to the same generic message; only
/// a token that validated but points at a deleted patient surfaces as
/// not-found.
pub async fn load_shared_record(
    state: &AppState,
    token: &str,
    password: &str,
) -> Result<SharedRecord> {
    let data = state.share_tokens.validate(token, password).ok_or_else(|| {
        AppError::Authentication("Senha incorreta ou link inválido/expirado".to_string())
    })?;

    tracing::info!("✅ Token válido, buscando dados do paciente: {}", data.patient_id);

    let patient_id = Uuid::parse_str(data.patient_id.trim()).map_err(|_| AppError::NotFound)?;

    let patient = patient_repo::get(&state.db, &patient_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let diagnosticos = diagnostico_repo::list(&state.db, Some(&patient_id)).await?;
    let atendimentos = atendimento_repo::list_by_patient(&state.db, &patient_id).await?;

    tracing::info!(
        "🎉 Dados carregados - diagnósticos: {}, atendimentos: {}",
        diagnosticos.len(),
        atendimentos.len(),
    );

    Ok(SharedRecord {
        patient,
        diagnosticos,
        atendimentos,
        token_info: TokenInfo {
            expires_at: data.expires_at,
            created_at: data.timestamp,
        },
    })
}
