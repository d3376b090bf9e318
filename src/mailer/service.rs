//! Preview and send flows on top of the render pipeline

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::confirm::{ConfirmationError, ConfirmedSend};
use super::transport::{Mailbox, MailTransport, OutboundEmail, TransportError};
use crate::config::MailConfig;
use crate::metrics::SendMetrics;
use crate::render::{RenderError, RenderPipeline, RenderRequest, RenderResult};

#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SendError {
    /// Short label used for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            SendError::Confirmation(_) => "confirmation",
            SendError::Render(_) => "render",
            SendError::Transport(_) => "transport",
        }
    }
}

/// Result of an accepted send
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    pub message_id: Uuid,
    pub accepted: usize,
    pub sent_at: DateTime<Utc>,
}

/// Composes emails from templates and hands them to a transport
pub struct Mailer {
    pipeline: Arc<RenderPipeline>,
    transport: Arc<dyn MailTransport>,
    config: MailConfig,
}

impl Mailer {
    pub fn new(
        pipeline: Arc<RenderPipeline>,
        transport: Arc<dyn MailTransport>,
        config: MailConfig,
    ) -> Self {
        Self {
            pipeline,
            transport,
            config,
        }
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Render without sending
    pub async fn preview(&self, request: &RenderRequest) -> Result<RenderResult, RenderError> {
        self.pipeline.render(request).await
    }

    /// Render and deliver to every recipient of the request
    #[tracing::instrument(
        skip(self, request, confirmation),
        fields(
            template_id = %request.template_id,
            recipient_count = request.recipients.len(),
            transport = self.transport.name()
        )
    )]
    pub async fn send(
        &self,
        request: &RenderRequest,
        confirmation: ConfirmedSend,
    ) -> Result<SendReceipt, SendError> {
        let result = self.deliver(request, confirmation).await;

        match &result {
            Ok(receipt) => {
                SendMetrics::record_sent(self.transport.name(), receipt.accepted);
                tracing::info!(
                    message_id = %receipt.message_id,
                    accepted = receipt.accepted,
                    "Email sent"
                );
            }
            Err(e) => {
                SendMetrics::record_failure(e.reason());
                tracing::warn!(error = %e, reason = e.reason(), "Send failed");
            }
        }

        result
    }

    async fn deliver(
        &self,
        request: &RenderRequest,
        confirmation: ConfirmedSend,
    ) -> Result<SendReceipt, SendError> {
        if !confirmation.covers(&request.recipients) {
            return Err(ConfirmationError::CountMismatch {
                expected: request.recipients.len(),
                acknowledged: confirmation.recipients(),
            }
            .into());
        }
        if request.recipients.is_empty() {
            return Err(TransportError::NoRecipients.into());
        }

        let rendered = self.pipeline.render(request).await?;
        let email = self.outbound(request, rendered);
        let receipt = self.transport.send(email).await?;

        Ok(SendReceipt {
            message_id: receipt.message_id,
            accepted: receipt.accepted,
            sent_at: receipt.sent_at,
        })
    }

    fn outbound(&self, request: &RenderRequest, rendered: RenderResult) -> OutboundEmail {
        let user = &request.current_user;
        let from = match user.email() {
            Some(email) => Mailbox {
                name: user.name().map(str::to_string),
                email: email.to_string(),
            },
            None => Mailbox {
                name: user
                    .name()
                    .map(str::to_string)
                    .or_else(|| self.config.from_name.clone()),
                email: self.config.from_address.clone(),
            },
        };

        let subject = request
            .fields
            .get(&self.config.subject_field)
            .cloned()
            .unwrap_or_default();

        OutboundEmail {
            from,
            to: request
                .recipients
                .iter()
                .map(|recipient| Mailbox {
                    name: recipient.name.clone(),
                    email: recipient.email.clone(),
                })
                .collect(),
            subject,
            html: rendered.html,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::MemoryTransport;
    use crate::render::{CurrentUser, Recipient};
    use crate::template::{MemoryTemplateStore, Template};

    const NOTE: &str = r#"<mjml><mj-body><mj-section><mj-column>
        <mj-text>From {{name}}: {{body}}</mj-text>
    </mj-column></mj-section></mj-body></mjml>"#;

    fn setup(transport: Arc<MemoryTransport>) -> Mailer {
        let store = MemoryTemplateStore::new();
        store
            .insert(
                Template {
                    id: "note".to_string(),
                    name: "Note".to_string(),
                    source: "note.mjml".to_string(),
                    description: None,
                    injections: vec![],
                },
                NOTE,
            )
            .unwrap();
        let pipeline = Arc::new(RenderPipeline::new(Arc::new(store), true));
        Mailer::new(pipeline, transport, MailConfig::default())
    }

    fn request() -> RenderRequest {
        let mut request = RenderRequest::new("note");
        request
            .fields
            .insert("subjectLine".to_string(), "Weekly note".to_string());
        request
            .fields
            .insert("body".to_string(), "all good".to_string());
        request.current_user = CurrentUser::new()
            .with("name", "Ada")
            .with("email", "ada@example.com");
        request.recipients = vec![
            Recipient::new("grace@example.com"),
            Recipient::named("alan@example.com", "Alan"),
        ];
        request
    }

    #[tokio::test]
    async fn test_send_delivers_rendered_email() {
        let transport = Arc::new(MemoryTransport::new());
        let mailer = setup(transport.clone());
        let request = request();

        let confirmation = ConfirmedSend::confirm(&request.recipients, Some(2)).unwrap();
        let receipt = mailer.send(&request, confirmation).await.unwrap();
        assert_eq!(receipt.accepted, 2);

        let sent = transport.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Weekly note");
        assert_eq!(sent[0].from.to_string(), "Ada <ada@example.com>");
        assert_eq!(sent[0].to[1].name.as_deref(), Some("Alan"));
        assert!(sent[0].html.contains("From Ada: all good"));
    }

    #[tokio::test]
    async fn test_preview_matches_sent_html() {
        let transport = Arc::new(MemoryTransport::new());
        let mailer = setup(transport.clone());
        let request = request();

        let preview = mailer.preview(&request).await.unwrap();
        let confirmation = ConfirmedSend::confirm(&request.recipients, Some(2)).unwrap();
        mailer.send(&request, confirmation).await.unwrap();

        assert_eq!(transport.sent().await[0].html, preview.html);
    }

    #[tokio::test]
    async fn test_sender_falls_back_to_configured_address() {
        let transport = Arc::new(MemoryTransport::new());
        let mailer = setup(transport.clone());
        let mut request = request();
        request.current_user = CurrentUser::new();

        let confirmation = ConfirmedSend::confirm(&request.recipients, Some(2)).unwrap();
        mailer.send(&request, confirmation).await.unwrap();

        let sent = transport.sent().await;
        assert_eq!(sent[0].from.email, MailConfig::default().from_address);
    }

    #[tokio::test]
    async fn test_confirmation_must_cover_recipients() {
        let transport = Arc::new(MemoryTransport::new());
        let mailer = setup(transport.clone());
        let mut request = request();

        let confirmation = ConfirmedSend::confirm(&request.recipients, Some(2)).unwrap();
        request.recipients.push(Recipient::new("extra@example.com"));

        let err = mailer.send(&request, confirmation).await.unwrap_err();
        assert!(matches!(err, SendError::Confirmation(_)));
        assert!(transport.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_recipient_list_rejected() {
        let transport = Arc::new(MemoryTransport::new());
        let mailer = setup(transport.clone());
        let mut request = request();
        request.recipients.clear();

        let confirmation = ConfirmedSend::confirm(&request.recipients, Some(0)).unwrap();
        let err = mailer.send(&request, confirmation).await.unwrap_err();
        assert!(matches!(err, SendError::Transport(TransportError::NoRecipients)));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let mailer = setup(Arc::new(MemoryTransport::failing("relay down")));
        let request = request();

        let confirmation = ConfirmedSend::confirm(&request.recipients, Some(2)).unwrap();
        let err = mailer.send(&request, confirmation).await.unwrap_err();
        assert_eq!(err.reason(), "transport");
    }

    #[tokio::test]
    async fn test_render_failure_is_reported() {
        let mailer = setup(Arc::new(MemoryTransport::new()));
        let mut request = request();
        request.template_id = "missing".to_string();

        let confirmation = ConfirmedSend::confirm(&request.recipients, Some(2)).unwrap();
        let err = mailer.send(&request, confirmation).await.unwrap_err();
        assert!(matches!(err, SendError::Render(RenderError::NotFound(_))));
    }
}
