//! Data endpoint the live view polls.
//!
//! Every poll is an isolated GET against the files the last generation
//! wrote; there is no push channel and no coordination between polls.

use actix_web::{HttpResponse, get, web};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::report::{PAYLOAD_FILE, ReportPayload};

/// Serve the full report payload of the most recent generation.
#[utoipa::path(
    get,
    path = "/api/v1/pulse",
    tag = "Pulse",
    responses(
        (status = 200, description = "Current report payload", body = ReportPayload),
        (status = 404, description = "No report generated yet", body = crate::error::ErrorResponse)
    )
)]
#[get("/pulse")]
pub async fn get_pulse(config: web::Data<Config>) -> AppResult<HttpResponse> {
    let payload = read_payload(&config).await?;
    Ok(HttpResponse::Ok().json(payload))
}

/// Serve the trend series alone, for lightweight chart refreshes.
#[utoipa::path(
    get,
    path = "/api/v1/trend",
    tag = "Pulse",
    responses(
        (status = 200, description = "Chronological trend series", body = [crate::models::TrendPoint]),
        (status = 404, description = "No report generated yet", body = crate::error::ErrorResponse)
    )
)]
#[get("/trend")]
pub async fn get_trend(config: web::Data<Config>) -> AppResult<HttpResponse> {
    let payload = read_payload(&config).await?;
    Ok(HttpResponse::Ok().json(payload.trend))
}

/// Load the payload the last pipeline run wrote.
async fn read_payload(config: &Config) -> AppResult<ReportPayload> {
    let path = config.output_dir.join(PAYLOAD_FILE);
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|_| AppError::NotFound("Report payload".to_string()))?;

    serde_json::from_str(&content)
        .map_err(|e| AppError::Storage(format!("Payload file unreadable: {}", e)))
}

/// Configure pulse data routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_pulse).service(get_trend);
}
