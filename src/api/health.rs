//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub templates: TemplateHealthResponse,
    pub transport: String,
}

#[derive(Debug, Serialize)]
pub struct TemplateHealthResponse {
    pub backend: String,
    pub available: bool,
    pub count: usize,
    pub cached: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime_seconds = state.start_time.elapsed().as_secs();

    let (available, count) = match state.templates.list().await {
        Ok(templates) => (true, templates.len()),
        Err(e) => {
            tracing::warn!(error = %e, "Template store unavailable");
            (false, 0)
        }
    };

    let status = if available { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        templates: TemplateHealthResponse {
            backend: state.templates.backend_name().to_string(),
            available,
            count,
            cached: state.pipeline.cached_templates(),
        },
        transport: state.mailer.transport_name().to_string(),
    })
}
