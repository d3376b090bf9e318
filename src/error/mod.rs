use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::injector::InjectionError;
use crate::mailer::{ConfirmationError, SendError, TransportError};
use crate::render::RenderError;
use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SendError> for AppError {
    fn from(err: SendError) -> Self {
        match err {
            SendError::Confirmation(e) => AppError::Confirmation(e),
            SendError::Render(e) => AppError::Render(e),
            SendError::Transport(e) => AppError::Transport(e),
        }
    }
}

impl From<TemplateError> for AppError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::NotFound(id) => AppError::NotFound(format!("Template not found: {}", id)),
            TemplateError::InvalidId(msg) => AppError::Validation(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Failure body: `{ message, err: { code, detail }, data }`
#[derive(Serialize)]
struct ErrorResponse {
    message: String,
    err: ErrorBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    detail: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

/// Client-facing text for internal failures
fn hidden(log_message: &str, public: &str) -> String {
    if is_production() {
        public.to_string()
    } else {
        log_message.to_string()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let log_message = self.to_string();
        let mut data = None;

        let (status, code, client_message) = match &self {
            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                hidden(&log_message, "Configuration error"),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Render(RenderError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                "TEMPLATE_NOT_FOUND",
                format!("Template not found: {}", id),
            ),
            AppError::Render(RenderError::Io { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "TEMPLATE_IO_ERROR",
                hidden(&log_message, "Template could not be read"),
            ),
            AppError::Render(RenderError::Compile(e)) => {
                data = Some(json!({ "line": e.line, "column": e.column }));
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "MARKUP_COMPILE_ERROR",
                    e.to_string(),
                )
            }
            AppError::Render(RenderError::Injection(e)) => {
                data = injection_data(e);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "INJECTION_ERROR",
                    e.to_string(),
                )
            }
            AppError::Confirmation(e) => (
                StatusCode::BAD_REQUEST,
                "CONFIRMATION_REQUIRED",
                e.to_string(),
            ),
            AppError::Transport(TransportError::NoRecipients) => (
                StatusCode::BAD_REQUEST,
                "NO_RECIPIENTS",
                log_message.clone(),
            ),
            AppError::Transport(TransportError::Rejected(_)) => (
                StatusCode::BAD_GATEWAY,
                "TRANSPORT_ERROR",
                hidden(&log_message, "Email could not be delivered"),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                hidden(&log_message, "Internal server error"),
            ),
        };

        // Always log the detailed error server-side
        if status.is_server_error() {
            tracing::error!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API error"
            );
        } else {
            tracing::warn!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API request rejected"
            );
        }

        let body = ErrorResponse {
            message: client_message.clone(),
            err: ErrorBody {
                code: code.to_string(),
                detail: client_message,
            },
            data,
        };

        (status, Json(body)).into_response()
    }
}

fn injection_data(err: &InjectionError) -> Option<Value> {
    match err {
        InjectionError::MissingValue(name)
        | InjectionError::UndeclaredInjection(name)
        | InjectionError::DuplicateValue(name)
        | InjectionError::KindMismatch { name, .. } => Some(json!({ "injection": name })),
        InjectionError::OptionNotAllowed { name, options, .. } => {
            Some(json!({ "injection": name, "options": options }))
        }
        InjectionError::Syntax(_) | InjectionError::Render(_) => None,
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::CompileError;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_compile_error_response() {
        let err = AppError::Render(RenderError::Compile(CompileError {
            line: 3,
            column: 5,
            message: "unknown tag <mj-x>".to_string(),
        }));
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["err"]["code"], "MARKUP_COMPILE_ERROR");
        assert_eq!(body["data"]["line"], 3);
        assert_eq!(body["data"]["column"], 5);
        assert!(body["message"].as_str().unwrap().contains("unknown tag"));
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let (status, body) =
            body_of(AppError::Render(RenderError::NotFound("nope".to_string()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["err"]["code"], "TEMPLATE_NOT_FOUND");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_confirmation_response() {
        let (status, body) = body_of(AppError::from(SendError::Confirmation(
            ConfirmationError::Missing(4),
        )))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["err"]["code"], "CONFIRMATION_REQUIRED");
    }

    #[tokio::test]
    async fn test_option_not_allowed_lists_options() {
        let err = AppError::Render(RenderError::Injection(InjectionError::OptionNotAllowed {
            name: "tone".to_string(),
            value: "angry".to_string(),
            options: vec!["formal".to_string(), "casual".to_string()],
        }));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["data"]["options"][1], "casual");
    }

    #[tokio::test]
    async fn test_transport_rejection() {
        let (status, body) =
            body_of(AppError::Transport(TransportError::Rejected("down".to_string()))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["err"]["code"], "TRANSPORT_ERROR");
    }
}
