use deadpool_postgres::Pool;

use crate::error::Result;

/// Outcome of a heartbeat probe, persisted for the diagnostics page.
pub struct HeartbeatEntry<'a> {
    pub status: &'a str,
    pub response_time_ms: i64,
    pub patient_count: Option<i64>,
    pub error_message: Option<&'a str>,
    /// JSON-encoded detail blob, stored as jsonb.
    pub error_details: Option<String>,
}

/// Records one heartbeat result.
pub async fn record(pool: &Pool, entry: &HeartbeatEntry<'_>) -> Result<()> {
    let client = pool.get().await?;
    client
        .execute(
            r#"
            INSERT INTO heartbeat_log
                (status, response_time_ms, patient_count, error_message, error_details)
            VALUES ($1, $2, $3, $4, $5::jsonb)
            "#,
            &[
                &entry.status,
                &entry.response_time_ms,
                &entry.patient_count,
                &entry.error_message,
                &entry.error_details,
            ],
        )
        .await?;
    Ok(())
}
