//! SparkPost webhook events
//!
//! SparkPost posts batches of events shaped `[{"msys": {"message_event": {...}}}]`.
//! Only events about the primary recipient of a message are reported; copies sent to
//! BCC targets carry `rcpt_type: "bcc"` and are skipped.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::callbacks::{
    CallbackError, CallbackHandler, DeliveryEvent, DeliveryEventKind,
};

use super::WebhookError;

/// Bounce classes SparkPost considers permanent
const HARD_BOUNCE_CLASSES: &[u16] = &[10, 30, 50, 51, 52, 53, 54, 90];

#[derive(Debug, Deserialize)]
struct WebhookEntry {
    msys: Option<Msys>,
}

#[derive(Debug, Deserialize)]
struct Msys {
    message_event: Option<RawEvent>,
    unsubscribe_event: Option<RawEvent>,
    track_event: Option<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    rcpt_to: Option<String>,
    rcpt_type: Option<String>,
    bounce_class: Option<Value>,
    raw_reason: Option<String>,
    reason: Option<String>,
    fbtype: Option<String>,
    transmission_id: Option<String>,
    rcpt_meta: Option<RcptMeta>,
    timestamp: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RcptMeta {
    #[serde(rename = "emailId")]
    email_id: Option<Value>,

    #[serde(rename = "leadId")]
    lead_id: Option<Value>,
}

/// Reads a number SparkPost may send either as a JSON number or a numeric string
fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}

fn event_kind(event: &RawEvent) -> Option<DeliveryEventKind> {
    let reason = || {
        event
            .raw_reason
            .clone()
            .or_else(|| event.reason.clone())
            .unwrap_or_default()
    };

    match event.event_type.as_str() {
        "bounce" => {
            let class = event
                .bounce_class
                .as_ref()
                .and_then(as_u64)
                .and_then(|class| u16::try_from(class).ok());

            match class {
                Some(class) if HARD_BOUNCE_CLASSES.contains(&class) => {
                    Some(DeliveryEventKind::Bounce {
                        reason: reason(),
                        class: Some(class),
                    })
                }
                _ => None,
            }
        }
        "policy_rejection" | "out_of_band" => Some(DeliveryEventKind::Bounce {
            reason: reason(),
            class: event
                .bounce_class
                .as_ref()
                .and_then(as_u64)
                .and_then(|class| u16::try_from(class).ok()),
        }),
        "spam_complaint" => Some(DeliveryEventKind::SpamComplaint {
            feedback_type: event.fbtype.clone().unwrap_or_default(),
        }),
        "list_unsubscribe" | "link_unsubscribe" => Some(DeliveryEventKind::Unsubscribe),
        "delivery" => Some(DeliveryEventKind::Delivery),
        _ => None,
    }
}

fn to_delivery_event(event: RawEvent) -> Option<DeliveryEvent> {
    if event.rcpt_type.as_deref().is_some_and(|kind| kind != "to") {
        return None;
    }

    let kind = event_kind(&event)?;
    let recipient = event.rcpt_to?;
    let meta = event.rcpt_meta.unwrap_or_default();

    Some(DeliveryEvent {
        transmission_id: event.transmission_id,
        recipient,
        kind,
        email_id: meta.email_id.as_ref().and_then(as_u64),
        lead_id: meta.lead_id.as_ref().and_then(as_u64),
        timestamp: event
            .timestamp
            .as_ref()
            .and_then(as_u64)
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
    })
}

/// Parses a webhook batch into the delivery events the host acts on.
///
/// Soft bounces, unknown event types and BCC copies are dropped.
pub fn parse_events(payload: &[u8]) -> Result<Vec<DeliveryEvent>, WebhookError> {
    let entries: Vec<WebhookEntry> = serde_json::from_slice(payload)?;

    let events: Vec<DeliveryEvent> = entries
        .into_iter()
        .filter_map(|entry| entry.msys)
        .filter_map(|msys| {
            msys.message_event
                .or(msys.unsubscribe_event)
                .or(msys.track_event)
        })
        .filter_map(to_delivery_event)
        .collect();

    debug!(events = events.len(), "parsed webhook batch");

    Ok(events)
}

/// Basic-auth credentials configured on the SparkPost webhook
#[derive(Clone)]
pub struct WebhookAuth {
    username: String,
    password: String,
}

impl WebhookAuth {
    /// Create new credentials
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Checks an `Authorization` header value against the credentials
    pub fn verify(&self, authorization: Option<&str>) -> bool {
        let Some(encoded) = authorization.and_then(|value| value.strip_prefix("Basic ")) else {
            return false;
        };

        let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
            return false;
        };

        let Some((username, password)) = std::str::from_utf8(&decoded)
            .ok()
            .and_then(|credentials| credentials.split_once(':'))
        else {
            return false;
        };

        let username_matches = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let password_matches = constant_time_eq(password.as_bytes(), self.password.as_bytes());

        username_matches && password_matches
    }
}

impl std::fmt::Debug for WebhookAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookAuth")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Hands parsed webhook events to the host's [`CallbackHandler`]
#[derive(Debug)]
pub struct WebhookProcessor<H>
where
    H: CallbackHandler,
{
    handler: Arc<H>,
    auth: Option<WebhookAuth>,
}

impl<H> WebhookProcessor<H>
where
    H: CallbackHandler,
{
    /// Create a new processor; with `auth` set, requests must carry matching credentials
    pub fn new(handler: Arc<H>, auth: Option<WebhookAuth>) -> Self {
        Self { handler, auth }
    }

    /// Processes one webhook request, returning the number of events handled.
    ///
    /// Events for recipients the host does not know are skipped; any other handler
    /// error aborts the batch so SparkPost retries it.
    pub async fn process(
        &self,
        authorization: Option<&str>,
        payload: &[u8],
    ) -> Result<usize, WebhookError> {
        if let Some(auth) = &self.auth {
            if !auth.verify(authorization) {
                warn!("rejected webhook request with invalid credentials");
                return Err(WebhookError::Unauthorized);
            }
        }

        let mut handled = 0;

        for event in parse_events(payload)? {
            match self.handler.handle(&event).await {
                Ok(()) => handled += 1,
                Err(CallbackError::UnknownRecipient(recipient)) => {
                    debug!(%recipient, "skipping event for unknown recipient");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(handled)
    }
}
