//! API layer - HTTP endpoint handlers organized by domain.

mod compose;
mod health;
mod metrics;
mod routes;
mod template;

// Re-export all handlers for use in server/app.rs
pub use compose::{preview, send, ComposeForm, ComposeRequest, PreviewResponse, SendResponse};
pub use health::{health, HealthResponse, TemplateHealthResponse};
pub use metrics::prometheus_metrics;
pub use routes::api_routes;
pub use template::{get_template, list_templates};
