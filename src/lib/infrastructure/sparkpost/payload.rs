//! Transmission payloads
//!
//! Maps a [`Message`] onto the JSON SparkPost's transmissions and content previewer
//! endpoints accept.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use tracing::debug;

use crate::domain::mailer::{
    placeholder, Attachment, Envelope, Message, MessageKind, Recipient, RecipientMetadata,
    SendOptions, SubstitutionData, TokenMap, TrackingSettings, TransportError,
};

const LIST_UNSUBSCRIBE_KEY: &str = "LISTUNSUBSCRIBEHEADER";

/// Headers SparkPost derives from the content block itself
const RESERVED_HEADERS: &[&str] = &[
    "bcc",
    "cc",
    "content-transfer-encoding",
    "content-type",
    "date",
    "from",
    "message-id",
    "mime-version",
    "reply-to",
    "return-path",
    "sender",
    "subject",
    "to",
];

/// An attachment as SparkPost expects it
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttachmentPayload {
    /// File name
    pub name: String,

    /// MIME type
    #[serde(rename = "type")]
    pub content_type: String,

    /// Base64-encoded contents
    pub data: String,
}

impl From<&Attachment> for AttachmentPayload {
    fn from(attachment: &Attachment) -> Self {
        Self {
            name: attachment.name.clone(),
            content_type: attachment.content_type.clone(),
            data: STANDARD.encode(&attachment.data),
        }
    }
}

/// The content block shared by every recipient of a transmission
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Content {
    /// The rendered sender, e.g. `Admin <admin@example.com>`
    pub from: String,

    /// Subject with placeholders
    pub subject: String,

    /// Headers with placeholders
    pub headers: BTreeMap<String, String>,

    /// HTML body with placeholders
    pub html: Option<String>,

    /// Text body with placeholders
    pub text: Option<String>,

    /// Reply-to address
    pub reply_to: String,

    /// Attachments
    pub attachments: Vec<AttachmentPayload>,
}

/// A recipient address
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AddressPayload {
    /// Email address
    pub email: String,

    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One entry of the recipients array
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecipientPayload {
    /// Where the copy is delivered
    pub address: AddressPayload,

    /// The `To` header shown on a BCC copy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_to: Option<String>,

    /// Metadata echoed back in webhook events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecipientMetadata>,

    /// Values for the content placeholders
    pub substitution_data: SubstitutionData,
}

/// The body of a transmissions request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transmission {
    /// Shared content
    pub content: Content,

    /// Recipients, BCC copies included
    pub recipients: Vec<RecipientPayload>,

    /// Delivery options
    pub options: SendOptions,

    /// Tags
    pub tags: Vec<String>,

    /// The UTM campaign
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,

    /// Default substitution data, taken from the first recipient
    pub substitution_data: SubstitutionData,

    /// Whether SparkPost should inline CSS
    pub inline_css: Option<bool>,
}

/// The body of a content previewer request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PreviewRequest {
    /// Shared content
    pub content: Content,

    /// Substitution data to render the preview with
    pub substitution_data: SubstitutionData,

    /// Delivery options
    pub options: SendOptions,

    /// Tags
    pub tags: Vec<String>,

    /// The UTM campaign
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,

    /// Whether SparkPost should inline CSS
    pub inline_css: Option<bool>,
}

impl From<&Transmission> for PreviewRequest {
    fn from(transmission: &Transmission) -> Self {
        Self {
            content: transmission.content.clone(),
            substitution_data: transmission.substitution_data.clone(),
            options: transmission.options,
            tags: transmission.tags.clone(),
            campaign_id: transmission.campaign_id.clone(),
            inline_css: transmission.inline_css,
        }
    }
}

fn has_header(headers: &BTreeMap<String, String>, name: &str) -> bool {
    headers.keys().any(|key| key.eq_ignore_ascii_case(name))
}

fn set_header(headers: &mut BTreeMap<String, String>, name: &str, value: String) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value);
}

fn build_headers(message: &Message, tokens: &TokenMap) -> BTreeMap<String, String> {
    let mut headers: BTreeMap<String, String> = message
        .headers
        .iter()
        .filter(|(name, _)| !RESERVED_HEADERS.contains(&name.to_ascii_lowercase().as_str()))
        .map(|(name, value)| (name.clone(), tokens.replace(value)))
        .collect();

    if message.kind == MessageKind::Bulk {
        if !has_header(&headers, "Precedence") {
            set_header(&mut headers, "Precedence", "Bulk".to_string());
        }

        if let Some(email_id) = message.email_id {
            if !has_header(&headers, "X-EMAIL-ID") {
                set_header(&mut headers, "X-EMAIL-ID", email_id.to_string());
            }
        }
    }

    if tokens.contains_key(LIST_UNSUBSCRIBE_KEY) {
        set_header(
            &mut headers,
            "List-Unsubscribe",
            placeholder(LIST_UNSUBSCRIBE_KEY),
        );
        set_header(
            &mut headers,
            "List-Unsubscribe-Post",
            "List-Unsubscribe=One-Click".to_string(),
        );
    }

    headers
}

fn contact_payload(
    recipient: &Recipient,
    substitution_data: SubstitutionData,
) -> RecipientPayload {
    RecipientPayload {
        address: AddressPayload {
            email: recipient.address.email().to_string(),
            name: Some(recipient.address.name_or_empty().to_string()),
        },
        header_to: None,
        metadata: Some(recipient.metadata.clone()),
        substitution_data,
    }
}

fn build_recipients(message: &Message, tokens: &TokenMap) -> Vec<RecipientPayload> {
    let copies = if message.bcc.is_some() { 2 } else { 1 };
    let mut recipients = Vec::with_capacity(message.recipients.len() * copies);

    for recipient in &message.recipients {
        let substitution_data = tokens.substitution_data(recipient);

        if let Some(bcc) = &message.bcc {
            recipients.push(contact_payload(recipient, substitution_data.clone()));
            recipients.push(RecipientPayload {
                address: AddressPayload {
                    email: bcc.to_string(),
                    name: None,
                },
                header_to: Some(recipient.address.email().to_string()),
                metadata: None,
                substitution_data,
            });
        } else {
            recipients.push(contact_payload(recipient, substitution_data));
        }
    }

    recipients
}

/// Builds the transmission for a message.
///
/// Raw tokens in the subject, bodies and headers become placeholders, and every
/// recipient receives the full set of substitution keys.
///
/// # Errors
/// [`TransportError::NoRecipients`] when the message has no recipients and
/// [`TransportError::MissingSender`] when neither the message nor the envelope has a
/// sender.
pub fn build_transmission(
    message: &Message,
    envelope: &Envelope,
    tracking: TrackingSettings,
) -> Result<Transmission, TransportError> {
    if message.recipients.is_empty() {
        return Err(TransportError::NoRecipients);
    }

    let from = message
        .from
        .as_ref()
        .or(envelope.sender.as_ref())
        .ok_or(TransportError::MissingSender)?;

    let tokens = TokenMap::from_recipients(&message.recipients);

    let content = Content {
        from: from.mailbox()?.to_string(),
        subject: tokens.replace(&message.subject),
        headers: build_headers(message, &tokens),
        html: message.html.as_deref().map(|html| tokens.replace(html)),
        text: message.text.as_deref().map(|text| tokens.replace(text)),
        reply_to: message.reply_to.as_ref().unwrap_or(from).email().to_string(),
        attachments: message.attachments.iter().map(AttachmentPayload::from).collect(),
    };

    let recipients = build_recipients(message, &tokens);

    let substitution_data = recipients
        .first()
        .map(|recipient| recipient.substitution_data.clone())
        .unwrap_or_default();

    debug!(
        recipients = recipients.len(),
        substitution_keys = substitution_data.len(),
        "built transmission"
    );

    Ok(Transmission {
        content,
        recipients,
        options: SendOptions::new(message.kind, tracking),
        tags: message.tags.clone(),
        campaign_id: message.campaign_id().map(str::to_string),
        substitution_data,
        inline_css: message.inline_css,
    })
}
