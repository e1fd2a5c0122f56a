//! SparkPost transport

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::domain::mailer::{
    Envelope, Message, SendReceipt, TrackingSettings, Transport, TransportError,
};

use super::{build_transmission, PreviewRequest, SparkPostApi, SparkPostError};

/// Sends messages through SparkPost: content preview first, then the transmission
#[derive(Debug, Clone)]
pub struct SparkPostTransport<C>
where
    C: SparkPostApi,
{
    client: C,
    tracking: TrackingSettings,
}

impl<C> SparkPostTransport<C>
where
    C: SparkPostApi,
{
    /// Create a new transport
    pub fn new(client: C, tracking: TrackingSettings) -> Self {
        Self { client, tracking }
    }

    /// The host tracking settings applied to bulk sends
    pub fn tracking(&self) -> TrackingSettings {
        self.tracking
    }
}

#[async_trait]
impl<C> Transport for SparkPostTransport<C>
where
    C: SparkPostApi,
{
    async fn send(
        &self,
        message: &Message,
        envelope: &Envelope,
    ) -> Result<SendReceipt, TransportError> {
        let transmission = build_transmission(message, envelope, self.tracking)?;

        let preview = self
            .client
            .preview(&PreviewRequest::from(&transmission))
            .await
            .map_err(|e| {
                error!("content preview failed: {e}");
                TransportError::PreviewError(e.to_string())
            })?;

        debug!(
            subject = preview.subject.as_deref().unwrap_or_default(),
            "content preview rendered"
        );

        let receipt: SendReceipt = self
            .client
            .transmit(&transmission)
            .await
            .map_err(|e| {
                error!("transmission failed: {e}");

                match e {
                    SparkPostError::Request(e) => TransportError::from(anyhow::Error::from(e)),
                    e => TransportError::DeliveryError(e.to_string()),
                }
            })?
            .into();

        if receipt.has_rejections() {
            warn!(
                transmission_id = %receipt.transmission_id,
                accepted = receipt.total_accepted,
                rejected = receipt.total_rejected,
                "SparkPost rejected recipients"
            );
        }

        info!(
            transmission_id = %receipt.transmission_id,
            accepted = receipt.total_accepted,
            "transmission accepted"
        );

        Ok(receipt)
    }
}
