use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::compose::{preview, send};
use super::health::health;
use super::metrics::prometheus_metrics;
use super::template::{get_template, list_templates};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest(
            "/api",
            Router::new()
                // Composition
                .route("/preview", post(preview))
                .route("/send", post(send))
                // Catalog
                .route("/templates", get(list_templates))
                .route("/templates/{id}", get(get_template)),
        )
}
