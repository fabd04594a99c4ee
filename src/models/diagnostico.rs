use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A diagnosis episode. Atendimentos (visits) hang off a diagnóstico, which
/// hangs off a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostico {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub discharge_date: Option<DateTime<Utc>>,
    pub doctor: Option<String>,
    pub anamnesis: Option<String>,
    pub diagnosis: Option<String>,
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub saturation: Option<i32>,
    pub temperature: Option<f64>,
    pub cardiac_auscultation: Option<String>,
    pub evolution: Option<String>,
    pub medications: Option<String>,
    pub additional_guidance: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating or updating a diagnóstico.
#[derive(Debug, Deserialize, garde::Validate)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticoInput {
    #[garde(skip)]
    pub patient_id: Uuid,
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(skip)]
    pub start_date: DateTime<Utc>,
    #[garde(skip)]
    pub discharge_date: Option<DateTime<Utc>>,
    #[garde(inner(length(max = 255)))]
    pub doctor: Option<String>,
    #[garde(skip)]
    pub anamnesis: Option<String>,
    #[garde(skip)]
    pub diagnosis: Option<String>,
    #[garde(inner(range(min = 0, max = 400)))]
    pub heart_rate: Option<i32>,
    #[garde(inner(range(min = 0, max = 200)))]
    pub respiratory_rate: Option<i32>,
    #[garde(inner(range(min = 0, max = 100)))]
    pub saturation: Option<i32>,
    #[garde(inner(range(min = 20.0, max = 45.0)))]
    pub temperature: Option<f64>,
    #[garde(skip)]
    pub cardiac_auscultation: Option<String>,
    #[garde(skip)]
    pub evolution: Option<String>,
    #[garde(skip)]
    pub medications: Option<String>,
    #[garde(skip)]
    pub additional_guidance: Option<String>,
}
