//! Callback handler contract

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use super::{CallbackError, DeliveryEvent};

/// Implemented by the host to record bounces, complaints and deliveries
#[async_trait]
pub trait CallbackHandler: Send + Sync + 'static {
    /// Records a single delivery event.
    ///
    /// Events carry the transmission id of the [`SendReceipt`] they belong to, so the host
    /// can correlate them with its own send log.
    ///
    /// [`SendReceipt`]: crate::domain::mailer::SendReceipt
    async fn handle(&self, event: &DeliveryEvent) -> Result<(), CallbackError>;
}

#[cfg(test)]
mock! {
    pub CallbackHandler {}

    #[async_trait]
    impl CallbackHandler for CallbackHandler {
        async fn handle(&self, event: &DeliveryEvent) -> Result<(), CallbackError>;
    }
}
