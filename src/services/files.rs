use axum::body::Bytes;
use tokio::fs;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::file::{AttachmentParent, FileAttachment},
    repositories::file as file_repo,
    state::AppState,
};

/// Maximum attachment size.
const MAX_FILE_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Content types accepted for medical attachments.
const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}

/// Strips anything path-like or shell-hostile from a client filename.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Validates and stores an uploaded attachment: bytes to disk under
/// `{parent_id}/{uuid}.{ext}`, metadata (with a BLAKE3 checksum) to the
/// database.
pub async fn store_attachment(
    state: &AppState,
    parent_kind: AttachmentParent,
    parent_id: Uuid,
    original_name: &str,
    content_type: &str,
    bytes: Bytes,
) -> Result<FileAttachment> {
    if bytes.is_empty() {
        return Err(AppError::Validation("Arquivo vazio".to_string()));
    }
    if bytes.len() > MAX_FILE_SIZE_BYTES {
        return Err(AppError::Validation(
            "Arquivo excede o tamanho máximo de 10MB".to_string(),
        ));
    }
    if !is_allowed_mime(content_type) {
        return Err(AppError::Validation(format!(
            "Tipo de arquivo não permitido: {}",
            content_type
        )));
    }

    // The claimed type must agree with what the bytes look like. Formats
    // `infer` cannot identify are left to the claimed type.
    if let Some(kind) = infer::get(&bytes) {
        if !is_allowed_mime(kind.mime_type()) {
            tracing::warn!(
                "❌ Upload rejeitado - declarado {}, detectado {}",
                content_type,
                kind.mime_type(),
            );
            return Err(AppError::Validation(
                "Conteúdo do arquivo não corresponde ao tipo declarado".to_string(),
            ));
        }
    }

    let original_name = sanitize_filename(original_name);
    let extension = original_name.rsplit('.').next().unwrap_or("bin");
    let relative_path = format!("{}/{}.{}", parent_id, Uuid::new_v4(), extension);
    let absolute_path = state.config.storage_dir.join(&relative_path);

    if let Some(parent_dir) = absolute_path.parent() {
        fs::create_dir_all(parent_dir).await?;
    }

    let checksum = hex::encode(blake3::hash(&bytes).as_bytes());
    let file_size = bytes.len() as i64;
    fs::write(&absolute_path, &bytes).await?;

    tracing::info!(
        "📎 Arquivo armazenado - {} ({} bytes) em {}",
        original_name,
        file_size,
        relative_path,
    );

    file_repo::create(
        &state.db,
        parent_kind,
        &parent_id,
        &original_name,
        &relative_path,
        file_size,
        content_type,
        &checksum,
    )
    .await
}

/// Opens a stored attachment for streaming.
pub async fn open_attachment(
    state: &AppState,
    id: Uuid,
) -> Result<(FileAttachment, fs::File)> {
    let attachment = file_repo::get(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    let path = state.config.storage_dir.join(&attachment.file_path);
    let file = fs::File::open(&path).await.map_err(|e| {
        tracing::error!("❌ Arquivo ausente no disco: {} ({})", attachment.file_path, e);
        AppError::NotFound
    })?;

    Ok((attachment, file))
}

/// Deletes an attachment from disk and database. A missing disk file is
/// logged and does not block removing the metadata.
pub async fn delete_attachment(state: &AppState, id: Uuid) -> Result<()> {
    let attachment = file_repo::get(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    let path = state.config.storage_dir.join(&attachment.file_path);
    if let Err(e) = fs::remove_file(&path).await {
        tracing::warn!("⚠️ Erro ao deletar arquivo do disco: {}", e);
    }

    file_repo::delete(&state.db, &id).await?;
    tracing::info!("🗑️ Anexo removido: {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("exame 2024.pdf"), "exame 2024.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("laudo;rm -rf.png"), "laudo_rm -rf.png");
    }

    #[test]
    fn mime_allow_list_matches_the_upload_dialog() {
        assert!(is_allowed_mime("application/pdf"));
        assert!(is_allowed_mime("image/png"));
        assert!(!is_allowed_mime("text/html"));
        assert!(!is_allowed_mime("application/zip"));
    }
}
