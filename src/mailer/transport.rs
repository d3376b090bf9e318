//! Outbound mail transports

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::MailConfig;

/// Transport failure
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Email has no recipients")]
    NoRecipients,

    #[error("Transport rejected the email: {0}")]
    Rejected(String),
}

/// A sender or recipient address with an optional display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mailbox {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
}

impl std::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.email),
            None => f.write_str(&self.email),
        }
    }
}

/// A fully rendered email handed to a transport
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEmail {
    pub from: Mailbox,
    pub to: Vec<Mailbox>,
    pub subject: String,
    pub html: String,
}

/// What a transport reports for an accepted email
#[derive(Debug, Clone)]
pub struct TransportReceipt {
    pub message_id: Uuid,
    pub accepted: usize,
    pub sent_at: DateTime<Utc>,
}

impl TransportReceipt {
    fn accepted(email: &OutboundEmail) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            accepted: email.to.len(),
            sent_at: Utc::now(),
        }
    }
}

/// Delivery backend behind the send boundary
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<TransportReceipt, TransportError>;

    /// Name used in logs and metrics
    fn name(&self) -> &'static str;
}

/// Accepts every email and logs a summary of it
#[derive(Debug, Default)]
pub struct LogTransport;

impl LogTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, email: OutboundEmail) -> Result<TransportReceipt, TransportError> {
        if email.to.is_empty() {
            return Err(TransportError::NoRecipients);
        }

        let receipt = TransportReceipt::accepted(&email);
        tracing::info!(
            message_id = %receipt.message_id,
            from = %email.from,
            recipients = email.to.len(),
            subject = %email.subject,
            bytes = email.html.len(),
            "Email accepted by log transport"
        );
        Ok(receipt)
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Keeps sent emails in memory
#[derive(Debug, Default)]
pub struct MemoryTransport {
    outbox: Mutex<Vec<OutboundEmail>>,
    failure: Option<String>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that rejects every email with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outbox: Mutex::new(Vec::new()),
            failure: Some(reason.into()),
        }
    }

    /// Emails accepted so far, oldest first
    pub async fn sent(&self) -> Vec<OutboundEmail> {
        self.outbox.lock().await.clone()
    }
}

#[async_trait]
impl MailTransport for MemoryTransport {
    async fn send(&self, email: OutboundEmail) -> Result<TransportReceipt, TransportError> {
        if email.to.is_empty() {
            return Err(TransportError::NoRecipients);
        }
        if let Some(reason) = &self.failure {
            return Err(TransportError::Rejected(reason.clone()));
        }

        let receipt = TransportReceipt::accepted(&email);
        self.outbox.lock().await.push(email);
        tracing::debug!(message_id = %receipt.message_id, "Email stored in memory outbox");
        Ok(receipt)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Create a mail transport based on configuration.
///
/// - `"log"` (default): [`LogTransport`]
/// - `"memory"`: [`MemoryTransport`]
pub fn create_transport(config: &MailConfig) -> Arc<dyn MailTransport> {
    match config.transport.as_str() {
        "memory" => {
            tracing::info!(transport = "memory", "Creating in-memory mail transport");
            Arc::new(MemoryTransport::new())
        }
        "log" => {
            tracing::info!(transport = "log", "Creating log mail transport");
            Arc::new(LogTransport::new())
        }
        other => {
            tracing::warn!(
                transport = %other,
                "Unknown mail transport, falling back to log transport"
            );
            Arc::new(LogTransport::new())
        }
    }
}
