//! Confirm-before-send gate

use thiserror::Error;

use crate::render::Recipient;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfirmationError {
    #[error("Sending to {0} recipients requires confirmation")]
    Missing(usize),

    #[error("Confirmed {acknowledged} recipients but the email goes to {expected}")]
    CountMismatch { expected: usize, acknowledged: usize },
}

/// Proof that the caller acknowledged how many people an email goes to.
///
/// Only [`ConfirmedSend::confirm`] builds one, and only when the acknowledged
/// count equals the recipient list length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedSend {
    recipients: usize,
}

impl ConfirmedSend {
    pub fn confirm(
        recipients: &[Recipient],
        acknowledged: Option<usize>,
    ) -> Result<Self, ConfirmationError> {
        let expected = recipients.len();
        match acknowledged {
            None => Err(ConfirmationError::Missing(expected)),
            Some(acknowledged) if acknowledged != expected => {
                Err(ConfirmationError::CountMismatch {
                    expected,
                    acknowledged,
                })
            }
            Some(_) => Ok(Self {
                recipients: expected,
            }),
        }
    }

    pub fn recipients(&self) -> usize {
        self.recipients
    }

    /// Whether this confirmation covers `recipients`
    pub fn covers(&self, recipients: &[Recipient]) -> bool {
        self.recipients == recipients.len()
    }
}
