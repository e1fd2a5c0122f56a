//! Batch send statistics

use serde::Serialize;
use tracing::warn;

use super::{Envelope, Message, SendReceipt, Transport, TransportError};

/// Running totals for a batch send, in the shape the host's batch reporter expects
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    /// Contacts handed to the provider and not rejected
    pub sent: u64,

    /// Contacts that could not be sent to
    pub failed: u64,

    /// Addresses of contacts whose send raised an error
    pub failed_recipients: Vec<String>,
}

impl BatchStats {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of sending `message`.
    ///
    /// Rejections inside an accepted transmission only move counts; the provider
    /// does not say which recipients it rejected. When the message carries a BCC
    /// address each contact is sent a second copy, and rejections are charged to those
    /// copies first: a contact only counts as failed once every BCC copy is accounted
    /// for.
    pub fn record(&mut self, message: &Message, outcome: &Result<SendReceipt, TransportError>) {
        let contacts = message.recipients.len() as u64;
        let bcc_copies = if message.bcc.is_some() { contacts } else { 0 };

        match outcome {
            Ok(receipt) => {
                let rejected = receipt
                    .total_rejected
                    .saturating_sub(bcc_copies)
                    .min(contacts);

                if rejected > 0 {
                    warn!(
                        transmission_id = %receipt.transmission_id,
                        rejected,
                        "transmission partially rejected"
                    );
                }

                self.sent += contacts - rejected;
                self.failed += rejected;
            }
            Err(_) => {
                self.failed += contacts;
                self.failed_recipients.extend(
                    message
                        .recipients
                        .iter()
                        .map(|recipient| recipient.address.email().to_string()),
                );
            }
        }
    }
}

/// Sends each message in turn and tallies the outcomes
pub async fn send_batch<T: Transport>(
    transport: &T,
    messages: &[Message],
    envelope: &Envelope,
) -> BatchStats {
    let mut stats = BatchStats::new();

    for message in messages {
        let outcome = transport.send(message, envelope).await;

        if let Err(e) = &outcome {
            warn!("send failed: {e}");
        }

        stats.record(message, &outcome);
    }

    stats
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::domain::mailer::{
        tests::MockTransport, Address, EmailAddress, EmailAddressError, Recipient,
    };

    use super::*;

    fn message(addresses: &[&str]) -> Result<Message, EmailAddressError> {
        let mut recipients = Vec::new();

        for address in addresses {
            recipients.push(Recipient::new(Address::from(EmailAddress::new(address)?)));
        }

        Ok(Message {
            recipients,
            ..Message::default()
        })
    }

    fn receipt(accepted: u64, rejected: u64) -> SendReceipt {
        SendReceipt {
            transmission_id: "11668787484950529".to_string(),
            total_accepted: accepted,
            total_rejected: rejected,
        }
    }

    #[test]
    fn test_record_accepted_batch() -> TestResult {
        let message = message(&["contact@one.email", "contact@two.email"])?;
        let mut stats = BatchStats::new();

        stats.record(&message, &Ok(receipt(1, 0)));

        assert_eq!(
            serde_json::to_string(&stats)?,
            r#"{"sent":2,"failed":0,"failedRecipients":[]}"#
        );

        Ok(())
    }

    #[test]
    fn test_record_partial_rejection_counts_only() -> TestResult {
        let message = message(&["contact@one.email", "contact@two.email"])?;
        let mut stats = BatchStats::new();

        stats.record(&message, &Ok(receipt(1, 1)));

        assert_eq!(stats.sent, 1);
        assert_eq!(stats.failed, 1);
        assert!(stats.failed_recipients.is_empty());

        Ok(())
    }

    #[test]
    fn test_record_rejected_bcc_copies_do_not_fail_contacts() -> TestResult {
        let mut message = message(&["contact@one.email", "contact@two.email"])?;
        message.bcc = Some(EmailAddress::new("custom@bcc.email")?);
        let mut stats = BatchStats::new();

        stats.record(&message, &Ok(receipt(2, 2)));

        assert_eq!(stats.sent, 2);
        assert_eq!(stats.failed, 0);

        stats.record(&message, &Ok(receipt(1, 3)));

        assert_eq!(stats.sent, 3);
        assert_eq!(stats.failed, 1);

        stats.record(&message, &Ok(receipt(0, 4)));

        assert_eq!(stats.sent, 3);
        assert_eq!(stats.failed, 3);

        Ok(())
    }

    #[test]
    fn test_record_failure_lists_recipients() -> TestResult {
        let message = message(&["contact@one.email"])?;
        let mut stats = BatchStats::new();

        stats.record(
            &message,
            &Err(TransportError::DeliveryError("unauthorized".to_string())),
        );

        assert_eq!(stats.sent, 0);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.failed_recipients, vec!["contact@one.email".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn test_send_batch_tallies_each_message() -> TestResult {
        let first = message(&["contact@one.email", "contact@two.email"])?;
        let second = message(&["contact@three.email"])?;

        let mut transport = MockTransport::new();
        let mut calls = 0;

        transport.expect_send().times(2).returning(move |_, _| {
            calls += 1;

            if calls == 1 {
                Ok(receipt(2, 0))
            } else {
                Err(TransportError::DeliveryError("rejected".to_string()))
            }
        });

        let stats = send_batch(&transport, &[first, second], &Envelope::default()).await;

        assert_eq!(stats.sent, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.failed_recipients, vec!["contact@three.email".to_string()]);

        Ok(())
    }
}
