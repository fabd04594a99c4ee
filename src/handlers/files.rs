use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::file::AttachmentParent,
    services::files as file_service,
    state::AppState,
};

/// Uploads one attachment. Multipart fields: `parentType`
/// (`diagnostico`/`atendimento`), `parentId` and `file`.
#[axum::debug_handler]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut parent_kind: Option<AttachmentParent> = None;
    let mut parent_id: Option<Uuid> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut data: Option<axum::body::Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Multipart(format!("Erro de leitura: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("parentType") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Multipart(format!("parentType: {}", e)))?;
                parent_kind = Some(AttachmentParent::parse(raw.trim()).ok_or_else(|| {
                    AppError::Multipart(format!("parentType inválido: {}", raw))
                })?);
            }
            Some("parentId") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Multipart(format!("parentId: {}", e)))?;
                parent_id = Some(
                    Uuid::parse_str(raw.trim())
                        .map_err(|_| AppError::Multipart("parentId inválido".to_string()))?,
                );
            }
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                content_type = field.content_type().map(str::to_string);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Multipart(format!("file: {}", e)))?,
                );
            }
            _ => {}
        }
    }

    let parent_kind =
        parent_kind.ok_or_else(|| AppError::Multipart("parentType é obrigatório".to_string()))?;
    let parent_id =
        parent_id.ok_or_else(|| AppError::Multipart("parentId é obrigatório".to_string()))?;
    let data = data.ok_or_else(|| AppError::Multipart("file é obrigatório".to_string()))?;
    let file_name =
        file_name.ok_or_else(|| AppError::Multipart("Nome do arquivo ausente".to_string()))?;
    let content_type = content_type
        .ok_or_else(|| AppError::Multipart("Tipo do arquivo ausente".to_string()))?;

    let attachment = file_service::store_attachment(
        &state,
        parent_kind,
        parent_id,
        &file_name,
        &content_type,
        data,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(attachment)))
}

/// Streams an attachment back as a download.
#[axum::debug_handler]
pub async fn download(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    let (attachment, file) = file_service::open_attachment(&state, id).await?;

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    let disposition = format!(
        "attachment; filename=\"{}\"",
        file_service::sanitize_filename(&attachment.original_name)
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, attachment.file_type)
        .header(header::CONTENT_LENGTH, attachment.file_size)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))
}

/// Deletes an attachment.
#[axum::debug_handler]
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    file_service::delete_attachment(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
