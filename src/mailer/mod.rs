//! Mail composition and delivery.
//!
//! # Transport Architecture
//!
//! Delivery sits behind the [`MailTransport`] trait:
//!
//! - `LogTransport`: logs a summary and accepts the email (default)
//! - `MemoryTransport`: records emails in an in-memory outbox
//!
//! Use `create_transport()` to build the transport selected in configuration.
//! [`Mailer::send`] only runs with a [`ConfirmedSend`] covering the request's
//! recipient list.

mod confirm;
mod service;
mod transport;

pub use confirm::{ConfirmationError, ConfirmedSend};
pub use service::{Mailer, SendError, SendReceipt};
pub use transport::{
    create_transport, LogTransport, Mailbox, MailTransport, MemoryTransport, OutboundEmail,
    TransportError, TransportReceipt,
};
