//! Delivery events

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What happened to a message after it was handed to the provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeliveryEventKind {
    /// The message bounced permanently
    Bounce {
        /// The provider's reason for the bounce
        reason: String,

        /// The provider's bounce classification, if any
        class: Option<u16>,
    },

    /// The recipient marked the message as spam
    SpamComplaint {
        /// The feedback loop report type, e.g. `abuse`
        feedback_type: String,
    },

    /// The recipient unsubscribed through a list-unsubscribe header or link
    Unsubscribe,

    /// The message was delivered
    Delivery,
}

impl DeliveryEventKind {
    /// Whether the recipient should no longer be mailed
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Delivery)
    }
}

/// A provider event about one recipient of one transmission
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeliveryEvent {
    /// The transmission the event belongs to
    pub transmission_id: Option<String>,

    /// The recipient's address
    pub recipient: String,

    /// What happened
    pub kind: DeliveryEventKind,

    /// The host email id, echoed from recipient metadata
    pub email_id: Option<u64>,

    /// The host contact id, echoed from recipient metadata
    pub lead_id: Option<u64>,

    /// When the provider recorded the event
    pub timestamp: Option<DateTime<Utc>>,
}
