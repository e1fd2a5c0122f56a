//! Callback errors

use thiserror::Error;

/// Errors a host handler may raise while recording a delivery event
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The recipient is not known to the host
    #[error("no contact found for {0}")]
    UnknownRecipient(String),

    /// Unknown error
    #[error(transparent)]
    UnknownError(#[from] anyhow::Error),
}
