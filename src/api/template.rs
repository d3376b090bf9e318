//! Template catalog endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::Result;
use crate::server::AppState;
use crate::template::{Template, TemplateListResponse};

/// GET /api/templates - List all templates
#[tracing::instrument(name = "http.list_templates", skip(state))]
pub async fn list_templates(State(state): State<AppState>) -> Result<Json<TemplateListResponse>> {
    let templates = state.templates.list().await?;
    let total = templates.len();

    Ok(Json(TemplateListResponse { templates, total }))
}

/// GET /api/templates/{id} - Get a specific template
#[tracing::instrument(name = "http.get_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Template>> {
    Ok(Json(state.templates.definition(&id).await?))
}
