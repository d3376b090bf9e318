//! Preview and send endpoints.

use std::collections::BTreeMap;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::mailer::{ConfirmedSend, SendReceipt};
use crate::metrics::SendMetrics;
use crate::render::{CurrentUser, FieldValues, Recipient, RenderRequest};
use crate::server::AppState;
use crate::telemetry::{attributes, record_span_attributes};
use crate::template::InjectionValue;

/// The composer form: template, injection values and free-form fields
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeForm {
    pub template_id: String,
    #[serde(default)]
    pub injections: Vec<InjectionValue>,
    /// Every other key, e.g. `subjectLine`
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeRequest {
    pub form: ComposeForm,
    #[serde(default)]
    pub current_user: CurrentUser,
    #[serde(default)]
    pub recipients: Vec<Recipient>,
    /// Recipient count the user acknowledged before sending
    #[serde(default)]
    pub confirmed_recipient_count: Option<usize>,
}

impl ComposeRequest {
    fn into_render_request(self) -> Result<RenderRequest> {
        let ComposeForm {
            template_id,
            injections,
            fields,
        } = self.form;

        Ok(RenderRequest {
            template_id,
            injections,
            fields: scalar_fields(fields)?,
            current_user: self.current_user,
            recipients: self.recipients,
        })
    }
}

/// Form fields are scalars; numbers and booleans are kept in their JSON form
fn scalar_fields(raw: BTreeMap<String, Value>) -> Result<FieldValues> {
    let mut fields = FieldValues::new();
    for (key, value) in raw {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(AppError::Validation(format!(
                    "form field `{}` must be a string, number or boolean",
                    key
                )))
            }
        };
        fields.insert(key, text);
    }
    Ok(fields)
}

fn parse_body(
    payload: std::result::Result<Json<ComposeRequest>, JsonRejection>,
) -> Result<ComposeRequest> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub message: String,
    pub data: SendReceipt,
}

/// POST /api/preview - Render the composed email without sending it
#[tracing::instrument(name = "http.preview", skip(state, payload))]
pub async fn preview(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ComposeRequest>, JsonRejection>,
) -> Result<Json<PreviewResponse>> {
    let request = parse_body(payload)?.into_render_request()?;
    record_span_attributes([
        attributes::template_id(&request.template_id),
        attributes::recipient_count(request.recipients.len()),
    ]);

    let rendered = state.mailer.preview(&request).await?;

    Ok(Json(PreviewResponse {
        html: rendered.html,
    }))
}

/// POST /api/send - Render and deliver the composed email
#[tracing::instrument(name = "http.send", skip(state, payload))]
pub async fn send(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ComposeRequest>, JsonRejection>,
) -> Result<Json<SendResponse>> {
    let body = parse_body(payload)?;
    let acknowledged = body.confirmed_recipient_count;
    let request = body.into_render_request()?;
    record_span_attributes([
        attributes::template_id(&request.template_id),
        attributes::recipient_count(request.recipients.len()),
        attributes::transport(state.mailer.transport_name()),
    ]);

    let confirmation = ConfirmedSend::confirm(&request.recipients, acknowledged)
        .inspect_err(|_| SendMetrics::record_failure("confirmation"))?;
    let receipt = state.mailer.send(&request, confirmation).await?;
    record_span_attributes([attributes::message_id(receipt.message_id)]);

    Ok(Json(SendResponse {
        message: format!("Email sent to {} recipients", receipt.accepted),
        data: receipt,
    }))
}
