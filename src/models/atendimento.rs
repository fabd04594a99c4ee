use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::file::FileAttachment;

/// A single visit within a diagnosis episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Atendimento {
    pub id: Uuid,
    pub diagnostico_id: Uuid,
    pub date: DateTime<Utc>,
    pub doctor: Option<String>,
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub saturation: Option<i32>,
    pub temperature: Option<f64>,
    pub cardiac_auscultation: Option<String>,
    pub evolution: Option<String>,
    pub medications: Option<String>,
    pub additional_guidance: Option<String>,
    #[serde(default)]
    pub attachments: Vec<FileAttachment>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating or updating an atendimento.
#[derive(Debug, Deserialize, garde::Validate)]
#[serde(rename_all = "camelCase")]
pub struct AtendimentoInput {
    #[garde(skip)]
    pub diagnostico_id: Uuid,
    #[garde(skip)]
    pub date: DateTime<Utc>,
    #[garde(inner(length(max = 255)))]
    pub doctor: Option<String>,
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
