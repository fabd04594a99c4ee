use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which record an attachment belongs to. Attachments are polymorphic over
/// diagnósticos and atendimentos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[postgres(name = "attachment_parent")]
#[serde(rename_all = "lowercase")]
pub enum AttachmentParent {
    #[postgres(name = "diagnostico")]
    Diagnostico,
    #[postgres(name = "atendimento")]
    Atendimento,
}

impl AttachmentParent {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "diagnostico" => Some(Self::Diagnostico),
            "atendimento" => Some(Self::Atendimento),
            _ => None,
        }
    }
}

/// Metadata of an uploaded file. The bytes live on disk under the configured
/// storage directory; `file_path` is relative to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    pub id: Uuid,
    pub parent_kind: AttachmentParent,
    pub parent_id: Uuid,
    pub original_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    /// BLAKE3 of the stored bytes, hex-encoded.
    pub checksum: String,
    pub uploaded_at: DateTime<Utc>,
}
