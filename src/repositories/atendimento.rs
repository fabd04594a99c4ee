use deadpool_postgres::Pool;
use std::collections::HashMap;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::atendimento::{Atendimento, AtendimentoInput},
    models::file::AttachmentParent,
    repositories::file as file_repo,
};

/// A helper function to map a `tokio_postgres::Row` to an `Atendimento`.
/// Attachments are loaded separately.
fn row_to_atendimento(row: &Row) -> Result<Atendimento> {
    Ok(Atendimento {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        diagnostico_id: row.try_get("diagnostico_id").map_err(|_| AppError::MissingData("diagnostico_id".to_string()))?,
        date: row.try_get("date").map_err(|_| AppError::MissingData("date".to_string()))?,
        doctor: row.try_get("doctor").map_err(|_| AppError::MissingData("doctor".to_string()))?,
        heart_rate: row.try_get("heart_rate").map_err(|_| AppError::MissingData("heart_rate".to_string()))?,
        respiratory_rate: row.try_get("respiratory_rate").map_err(|_| AppError::MissingData("respiratory_rate".to_string()))?,
        saturation: row.try_get("saturation").map_err(|_| AppError::MissingData("saturation".to_string()))?,
        temperature: row.try_get("temperature").map_err(|_| AppError::MissingData("temperature".to_string()))?,
        cardiac_auscultation: row.try_get("cardiac_auscultation").map_err(|_| AppError::MissingData("cardiac_auscultation".to_string()))?,
        evolution: row.try_get("evolution").map_err(|_| AppError::MissingData("evolution".to_string()))?,
        medications: row.try_get("medications").map_err(|_| AppError::MissingData("medications".to_string()))?,
        additional_guidance: row.try_get("additional_guidance").map_err(|_| AppError::MissingData("additional_guidance".to_string()))?,
        attachments: Vec::new(),
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
    })
}

/// Attaches file metadata to a batch of atendimentos with a single query.
async fn load_attachments(pool: &Pool, atendimentos: &mut [Atendimento]) -> Result<()> {
    if atendimentos.is_empty() {
        return Ok(());
    }

    let ids: Vec<Uuid> = atendimentos.iter().map(|a| a.id).collect();
    let attachments = file_repo::list_by_parents(pool, AttachmentParent::Atendimento, &ids).await?;

    let mut by_parent: HashMap<Uuid, Vec<_>> = HashMap::new();
    for attachment in attachments {
        by_parent.entry(attachment.parent_id).or_default().push(attachment);
    }
    for atendimento in atendimentos.iter_mut() {
        atendimento.attachments = by_parent.remove(&atendimento.id).unwrap_or_default();
    }
    Ok(())
}

/// Lists atendimentos, optionally scoped to one diagnóstico, newest first.
pub async fn list(pool: &Pool, diagnostico_id: Option<&Uuid>) -> Result<Vec<Atendimento>> {
    let client = pool.get().await?;
    let rows = match diagnostico_id {
        Some(diagnostico_id) => {
            client
                .query(
                    "SELECT * FROM atendimentos WHERE diagnostico_id = $1 ORDER BY date DESC",
                    &[diagnostico_id],
                )
                .await?
        }
        None => {
            client
                .query("SELECT * FROM atendimentos ORDER BY date DESC", &[])
                .await?
        }
    };
    drop(client);

    let mut atendimentos: Vec<Atendimento> =
        rows.iter().map(row_to_atendimento).collect::<Result<_>>()?;
    load_attachments(pool, &mut atendimentos).await?;
    Ok(atendimentos)
}

/// Lists every atendimento belonging to one patient, across all of the
/// patient's diagnósticos. This is what the share flow serves.
pub async fn list_by_patient(pool: &Pool, patient_id: &Uuid) -> Result<Vec<Atendimento>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT a.*
            FROM atendimentos a
            JOIN diagnosticos d ON d.id = a.diagnostico_id
            WHERE d.patient_id = $1
            ORDER BY a.date DESC
            "#,
            &[patient_id],
        )
        .await?;
    drop(client);

    let mut atendimentos: Vec<Atendimento> =
        rows.iter().map(row_to_atendimento).collect::<Result<_>>()?;
    load_attachments(pool, &mut atendimentos).await?;
    Ok(atendimentos)
}

/// Finds an atendimento by id, attachments included.
pub async fn get(pool: &Pool, id: &Uuid) -> Result<Option<Atendimento>> {
    let client = pool.get().await?;
    let row = client
        .query_opt("SELECT * FROM atendimentos WHERE id = $1", &[id])
        .await?;
    drop(client);

    match row {
        Some(row) => {
            let mut atendimentos = vec![row_to_atendimento(&row)?];
            load_attachments(pool, &mut atendimentos).await?;
            Ok(atendimentos.pop())
        }
        None => Ok(None),
    }
}

/// Creates a new atendimento.
pub async fn create(pool: &Pool, input: &AtendimentoInput) -> Result<Atendimento> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO atendimentos (
                diagnostico_id, date, doctor, heart_rate, respiratory_rate,
                saturation, temperature, cardiac_auscultation, evolution,
                medications, additional_guidance
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
            &[
                &input.diagnostico_id,
                &input.date,
                &input.doctor,
                &input.heart_rate,
                &input.respiratory_rate,
                &input.saturation,
                &input.temperature,
                &input.cardiac_auscultation,
                &input.evolution,
                &input.medications,
                &input.additional_guidance,
            ],
        )
        .await?;
    row_to_atendimento(&row)
}

/// Updates an existing atendimento.
pub async fn update(pool: &Pool, id: &Uuid, input: &AtendimentoInput) -> Result<Option<Atendimento>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE atendimentos
            SET date = $1, doctor = $2, heart_rate = $3, respiratory_rate = $4,
                saturation = $5, temperature = $6, cardiac_auscultation = $7,
                evolution = $8, medications = $9, additional_guidance = $10
            WHERE id = $11
            RETURNING *
            "#,
            &[
                &input.date,
                &input.doctor,
                &input.heart_rate,
                &input.respiratory_rate,
                &input.saturation,
                &input.temperature,
                &input.cardiac_auscultation,
                &input.evolution,
                &input.medications,
                &input.additional_guidance,
                id,
            ],
        )
        .await?;
    drop(client);

    match row {
        Some(row) => {
            let mut atendimentos = vec![row_to_atendimento(&row)?];
            load_attachments(pool, &mut atendimentos).await?;
            Ok(atendimentos.pop())
        }
        None => Ok(None),
    }
}

/// Deletes an atendimento.
pub async fn delete(pool: &Pool, id: &Uuid) -> Result<bool> {
    let client = pool.get().await?;
    let affected = client
        .execute("DELETE FROM atendimentos WHERE id = $1", &[id])
        .await?;
    Ok(affected > 0)
}
