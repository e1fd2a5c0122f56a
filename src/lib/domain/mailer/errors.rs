//! Transport errors

use thiserror::Error;

use super::EmailAddressError;

/// Errors raised while sending a message through a transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// The provider could not render the message content
    #[error("content preview failed: {0}")]
    PreviewError(String),

    /// The provider did not accept the transmission
    #[error("delivery failed: {0}")]
    DeliveryError(String),

    /// The message has no recipients
    #[error("message has no recipients")]
    NoRecipients,

    /// Neither the message nor the envelope names a sender
    #[error("message has no sender")]
    MissingSender,

    /// The sender could not be rendered into a header
    #[error("invalid sender: {0}")]
    InvalidSender(#[from] EmailAddressError),

    /// Unknown error
    #[error(transparent)]
    UnknownError(anyhow::Error),
}

impl From<anyhow::Error> for TransportError {
    fn from(err: anyhow::Error) -> Self {
        TransportError::UnknownError(err)
    }
}
