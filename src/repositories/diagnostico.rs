use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::diagnostico::{Diagnostico, DiagnosticoInput},
};

/// A helper function to map a `tokio_postgres::Row` to a `Diagnostico`.
fn row_to_diagnostico(row: &Row) -> Result<Diagnostico> {
    Ok(Diagnostico {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        patient_id: row.try_get("patient_id").map_err(|_| AppError::MissingData("patient_id".to_string()))?,
        name: row.try_get("name").map_err(|_| AppError::MissingData("name".to_string()))?,
        start_date: row.try_get("start_date").map_err(|_| AppError::MissingData("start_date".to_string()))?,
        discharge_date: row.try_get("discharge_date").map_err(|_| AppError::MissingData("discharge_date".to_string()))?,
        doctor: row.try_get("doctor").map_err(|_| AppError::MissingData("doctor".to_string()))?,
        anamnesis: row.try_get("anamnesis").map_err(|_| AppError::MissingData("anamnesis".to_string()))?,
        diagnosis: row.try_get("diagnosis").map_err(|_| AppError::MissingData("diagnosis".to_string()))?,
        heart_rate: row.try_get("heart_rate").map_err(|_| AppError::MissingData("heart_rate".to_string()))?,
        respiratory_rate: row.try_get("respiratory_rate").map_err(|_| AppError::MissingData("respiratory_rate".to_string()))?,
        saturation: row.try_get("saturation").map_err(|_| AppError::MissingData("saturation".to_string()))?,
        temperature: row.try_get("temperature").map_err(|_| AppError::MissingData("temperature".to_string()))?,
        cardiac_auscultation: row.try_get("cardiac_auscultation").map_err(|_| AppError::MissingData("cardiac_auscultation".to_string()))?,
        evolution: row.try_get("evolution").map_err(|_| AppError::MissingData("evolution".to_string()))?,
        medications: row.try_get("medications").map_err(|_| AppError::MissingData("medications".to_string()))?,
        additional_guidance: row.try_get("additional_guidance").map_err(|_| AppError::MissingData("additional_guidance".to_string()))?,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
    })
}

/// Lists diagnósticos, optionally scoped to one patient, newest first.
pub async fn list(pool: &Pool, patient_id: Option<&Uuid>) -> Result<Vec<Diagnostico>> {
    let client = pool.get().await?;
    let rows = match patient_id {
        Some(patient_id) => {
            client
                .query(
                    "SELECT * FROM diagnosticos WHERE patient_id = $1 ORDER BY start_date DESC",
                    &[patient_id],
                )
                .await?
        }
        None => {
            client
                .query("SELECT * FROM diagnosticos ORDER BY start_date DESC", &[])
                .await?
        }
    };
    rows.iter().map(row_to_diagnostico).collect()
}

/// Finds a diagnóstico by id.
pub async fn get(pool: &Pool, id: &Uuid) -> Result<Option<Diagnostico>> {
    let client = pool.get().await?;
    let row = client
        .query_opt("SELECT * FROM diagnosticos WHERE id = $1", &[id])
        .await?;
    row.map(|r| row_to_diagnostico(&r)).transpose()
}

/// Creates a new diagnóstico.
pub async fn create(pool: &Pool, input: &DiagnosticoInput) -> Result<Diagnostico> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO diagnosticos (
                patient_id, name, start_date, discharge_date, doctor, anamnesis,
                diagnosis, heart_rate, respiratory_rate, saturation, temperature,
                cardiac_auscultation, evolution, medications, additional_guidance
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
            &[
                &input.patient_id,
                &input.name,
                &input.start_date,
                &input.discharge_date,
                &input.doctor,
                &input.anamnesis,
                &input.diagnosis,
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
    row_to_diagnostico(&row)
}

/// Updates an existing diagnóstico.
pub async fn update(pool: &Pool, id: &Uuid, input: &DiagnosticoInput) -> Result<Option<Diagnostico>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE diagnosticos
            SET name = $1, start_date = $2, discharge_date = $3, doctor = $4,
                anamnesis = $5, diagnosis = $6, heart_rate = $7, respiratory_rate = $8,
                saturation = $9, temperature = $10, cardiac_auscultation = $11,
                evolution = $12, medications = $13, additional_guidance = $14
            WHERE id = $15
            RETURNING *
            "#,
            &[
                &input.name,
                &input.start_date,
                &input.discharge_date,
                &input.doctor,
                &input.anamnesis,
                &input.diagnosis,
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
    row.map(|r| row_to_diagnostico(&r)).transpose()
}

/// Deletes a diagnóstico. Its atendimentos cascade in the schema.
pub async fn delete(pool: &Pool, id: &Uuid) -> Result<bool> {
    let client = pool.get().await?;
    let affected = client
        .execute("DELETE FROM diagnosticos WHERE id = $1", &[id])
        .await?;
    Ok(affected > 0)
}
