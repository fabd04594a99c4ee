use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::patient::{Patient, PatientInput},
};

/// A helper function to map a `tokio_postgres::Row` to a `Patient`.
fn row_to_patient(row: &Row) -> Result<Patient> {
    Ok(Patient {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        name: row.try_get("name").map_err(|_| AppError::MissingData("name".to_string()))?,
        cpf: row.try_get("cpf").map_err(|_| AppError::MissingData("cpf".to_string()))?,
        birth_date: row.try_get("birth_date").map_err(|_| AppError::MissingData("birth_date".to_string()))?,
        phone: row.try_get("phone").map_err(|_| AppError::MissingData("phone".to_string()))?,
        email: row.try_get("email").map_err(|_| AppError::MissingData("email".to_string()))?,
        address: row.try_get("address").map_err(|_| AppError::MissingData("address".to_string()))?,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
    })
}

/// Lists all patients ordered by name.
pub async fn list(pool: &Pool) -> Result<Vec<Patient>> {
    let client = pool.get().await?;
    let rows = client
        .query("SELECT * FROM patients ORDER BY name", &[])
        .await?;
    rows.iter().map(row_to_patient).collect()
}

/// Finds a patient by id.
pub async fn get(pool: &Pool, id: &Uuid) -> Result<Option<Patient>> {
    let client = pool.get().await?;
    let row = client
        .query_opt("SELECT * FROM patients WHERE id = $1", &[id])
        .await?;
    row.map(|r| row_to_patient(&r)).transpose()
}

/// Creates a new patient.
pub async fn create(pool: &Pool, input: &PatientInput) -> Result<Patient> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO patients (name, cpf, birth_date, phone, email, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
            &[
                &input.name,
                &input.cpf,
                &input.birth_date,
                &input.phone,
                &input.email,
                &input.address,
            ],
        )
        .await?;
    row_to_patient(&row)
}

/// Updates an existing patient.
pub async fn update(pool: &Pool, id: &Uuid, input: &PatientInput) -> Result<Option<Patient>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE patients
            SET name = $1, cpf = $2, birth_date = $3, phone = $4, email = $5, address = $6
            WHERE id = $7
            RETURNING *
            "#,
            &[
                &input.name,
                &input.cpf,
                &input.birth_date,
                &input.phone,
                &input.email,
                &input.address,
                id,
            ],
        )
        .await?;
    row.map(|r| row_to_patient(&r)).transpose()
}

/// Deletes a patient. Diagnósticos and atendimentos cascade in the schema.
pub async fn delete(pool: &Pool, id: &Uuid) -> Result<bool> {
    let client = pool.get().await?;
    let affected = client
        .execute("DELETE FROM patients WHERE id = $1", &[id])
        .await?;
    Ok(affected > 0)
}

/// Counts patients; used by the heartbeat probe.
pub async fn count(pool: &Pool) -> Result<i64> {
    let client = pool.get().await?;
    let row = client.query_one("SELECT COUNT(*) FROM patients", &[]).await?;
    Ok(row.try_get(0).map_err(|_| AppError::MissingData("count".to_string()))?)
}
