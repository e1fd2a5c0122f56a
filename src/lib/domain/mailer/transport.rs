//! Mail transport contract

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use super::{Envelope, Message, SendReceipt, TransportError};

/// A transport delivers composed messages to an email provider
#[async_trait]
pub trait Transport: Clone + Send + Sync + 'static {
    /// Sends a message
    ///
    /// # Arguments
    /// * `message` - The composed [`Message`], with its recipients and their tokens.
    /// * `envelope` - The [`Envelope`], whose sender is used when the message has none.
    ///
    /// # Returns
    /// - [`Ok`] with the provider's [`SendReceipt`] once the transmission is accepted.
    /// - [`Err`] containing a [`TransportError`] if the content could not be rendered or
    ///   the provider refused the transmission.
    async fn send(
        &self,
        message: &Message,
        envelope: &Envelope,
    ) -> Result<SendReceipt, TransportError>;
}

#[cfg(test)]
mock! {
    pub Transport {}

    impl Clone for Transport {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl Transport for Transport {
        async fn send(&self, message: &Message, envelope: &Envelope) -> Result<SendReceipt, TransportError>;
    }
}
