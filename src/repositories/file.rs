use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::file::{AttachmentParent, FileAttachment},
};

/// A helper function to map a `tokio_postgres::Row` to a `FileAttachment`.
fn row_to_attachment(row: &Row) -> Result<FileAttachment> {
    Ok(FileAttachment {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        parent_kind: row.try_get("parent_kind").map_err(|_| AppError::MissingData("parent_kind".to_string()))?,
        parent_id: row.try_get("parent_id").map_err(|_| AppError::MissingData("parent_id".to_string()))?,
        original_name: row.try_get("original_name").map_err(|_| AppError::MissingData("original_name".to_string()))?,
        file_path: row.try_get("file_path").map_err(|_| AppError::MissingData("file_path".to_string()))?,
        file_size: row.try_get("file_size").map_err(|_| AppError::MissingData("file_size".to_string()))?,
        file_type: row.try_get("file_type").map_err(|_| AppError::MissingData("file_type".to_string()))?,
        checksum: row.try_get("checksum").map_err(|_| AppError::MissingData("checksum".to_string()))?,
        uploaded_at: row.try_get("uploaded_at").map_err(|_| AppError::MissingData("uploaded_at".to_string()))?,
    })
}

/// Inserts attachment metadata after the bytes were written to disk.
pub async fn create(
    pool: &Pool,
    parent_kind: AttachmentParent,
    parent_id: &Uuid,
    original_name: &str,
    file_path: &str,
    file_size: i64,
    file_type: &str,
    checksum: &str,
) -> Result<FileAttachment> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO file_attachments
                (parent_kind, parent_id, original_name, file_path, file_size, file_type, checksum)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
            &[
                &parent_kind,
                parent_id,
                &original_name,
                &file_path,
                &file_size,
                &file_type,
                &checksum,
            ],
        )
        .await?;
    row_to_attachment(&row)
}

/// Finds an attachment by id.
pub async fn get(pool: &Pool, id: &Uuid) -> Result<Option<FileAttachment>> {
    let client = pool.get().await?;
    let row = client
        .query_opt("SELECT * FROM file_attachments WHERE id = $1", &[id])
        .await?;
    row.map(|r| row_to_attachment(&r)).transpose()
}

/// Lists the attachments of a batch of parent records.
pub async fn list_by_parents(
    pool: &Pool,
    parent_kind: AttachmentParent,
    parent_ids: &[Uuid],
) -> Result<Vec<FileAttachment>> {
    let client = pool.get().await?;
    let ids: Vec<Uuid> = parent_ids.to_vec();
    let rows = client
        .query(
            r#"
            SELECT * FROM file_attachments
            WHERE parent_kind = $1 AND parent_id = ANY($2)
            ORDER BY uploaded_at
            "#,
            &[&parent_kind, &ids],
        )
        .await?;
    rows.iter().map(row_to_attachment).collect()
}

/// Deletes attachment metadata.
pub async fn delete(pool: &Pool, id: &Uuid) -> Result<bool> {
    let client = pool.get().await?;
    let affected = client
        .execute("DELETE FROM file_attachments WHERE id = $1", &[id])
        .await?;
    Ok(affected > 0)
}
