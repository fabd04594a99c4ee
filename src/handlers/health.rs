use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::time::Instant;

use crate::{
    auth::password::constant_time_eq,
    repositories::{heartbeat as heartbeat_repo, patient as patient_repo},
    state::AppState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<i64>,
    pub total_time_ms: i64,
}

#[derive(Serialize)]
pub struct HeartbeatResponse {
    pub status: &'static str,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metrics: HeartbeatMetrics,
}

/// Scheduled heartbeat probe: a light count query against the patients
/// table, with the result recorded in `heartbeat_log`.
///
/// When `CRON_SECRET` is configured the caller must present it as a Bearer
/// token; otherwise the endpoint is open (development).
#[axum::debug_handler]
pub async fn heartbeat(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let start = Instant::now();

    if let Some(cron_secret) = &state.config.cron_secret {
        let authorized = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| constant_time_eq(value, &format!("Bearer {}", cron_secret)));

        if !authorized {
            tracing::error!("Heartbeat: Tentativa de acesso não autorizado");
            return (
                StatusCode::UNAUTHORIZED,
                Json(sonic_rs::json!({"error": "Unauthorized"})),
            )
                .into_response();
        }
    }

    tracing::info!("Heartbeat: Iniciando verificação de saúde do banco de dados...");

    match patient_repo::count(&state.db).await {
        Ok(patient_count) => {
            let response_time_ms = start.elapsed().as_millis() as i64;

            let entry = heartbeat_repo::HeartbeatEntry {
                status: "success",
                response_time_ms,
                patient_count: Some(patient_count),
                error_message: None,
                error_details: None,
            };
            if let Err(e) = heartbeat_repo::record(&state.db, &entry).await {
                tracing::warn!("Heartbeat: Falha ao registrar resultado: {}", e);
            }

            let total_time_ms = start.elapsed().as_millis() as i64;
            tracing::info!(
                "Heartbeat: SUCESSO - pacientes: {}, tempo: {}ms",
                patient_count,
                total_time_ms,
            );

            Json(HeartbeatResponse {
                status: "success",
                timestamp: chrono::Utc::now().to_rfc3339(),
                error: None,
                metrics: HeartbeatMetrics {
                    patient_count: Some(patient_count),
                    response_time_ms: Some(response_time_ms),
                    total_time_ms,
                },
            })
            .into_response()
        }
        Err(e) => {
            let total_time_ms = start.elapsed().as_millis() as i64;
            let error_message = e.to_string();

            let details = sonic_rs::to_string(&sonic_rs::json!({
                "error": error_message.as_str(),
            }))
            .ok();
            let entry = heartbeat_repo::HeartbeatEntry {
                status: "failure",
                response_time_ms: total_time_ms,
                patient_count: None,
                error_message: Some(&error_message),
                error_details: details,
            };
            if let Err(log_error) = heartbeat_repo::record(&state.db, &entry).await {
                tracing::error!("Heartbeat: Falha ao registrar erro: {}", log_error);
            }

            tracing::error!("Heartbeat: FALHA - {} ({}ms)", error_message, total_time_ms);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HeartbeatResponse {
                    status: "failure",
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    error: Some(error_message),
                    metrics: HeartbeatMetrics {
                        patient_count: None,
                        response_time_ms: None,
                        total_time_ms,
                    },
                }),
            )
                .into_response()
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStatus {
    pub table: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseDiagnostics {
    pub status: &'static str,
    pub response_time_ms: i64,
    pub tables: Vec<TableStatus>,
}

const DIAGNOSED_TABLES: &[&str] = &[
    "patients",
    "diagnosticos",
    "atendimentos",
    "file_attachments",
];

/// Connectivity and per-table row counts for the diagnostics page.
#[axum::debug_handler]
pub async fn database_diagnostics(State(state): State<AppState>) -> Json<DatabaseDiagnostics> {
    let start = Instant::now();
    let mut tables = Vec::with_capacity(DIAGNOSED_TABLES.len());
    let mut healthy = true;

    for table in DIAGNOSED_TABLES {
        let status = match table_count(&state, table).await {
            Ok(count) => TableStatus {
                table,
                count: Some(count),
                error: None,
            },
            Err(e) => {
                healthy = false;
                TableStatus {
                    table,
                    count: None,
                    error: Some(e.to_string()),
                }
            }
        };
        tables.push(status);
    }

    Json(DatabaseDiagnostics {
        status: if healthy { "ok" } else { "error" },
        response_time_ms: start.elapsed().as_millis() as i64,
        tables,
    })
}

async fn table_count(state: &AppState, table: &str) -> crate::error::Result<i64> {
    let client = state.db.get().await?;
    // Table names come from the fixed list above, never from input.
    let row = client
        .query_one(&format!("SELECT COUNT(*) FROM {}", table), &[])
        .await?;
    row.try_get(0)
        .map_err(|_| crate::error::AppError::MissingData("count".to_string()))
}
