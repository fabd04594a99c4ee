use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A patient record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub cpf: String,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating or updating a patient.
#[derive(Debug, Deserialize, garde::Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatientInput {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    /// CPF with or without separators.
    #[garde(length(min = 11, max = 14))]
    pub cpf: String,
    #[garde(skip)]
    pub birth_date: NaiveDate,
    #[garde(length(min = 1, max = 40))]
    pub phone: String,
    #[garde(inner(email))]
    pub email: Option<String>,
    #[garde(inner(length(max = 500)))]
    pub address: Option<String>,
}
