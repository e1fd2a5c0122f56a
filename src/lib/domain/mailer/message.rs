//! Email message

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Address, EmailAddress};

/// Whether a message is a one-off transactional send or part of a list send
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// A one-off message to a single contact
    #[default]
    Transactional,

    /// A segment or list send
    Bulk,
}

/// UTM tags attached to an email
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtmTags {
    /// utm_source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,

    /// utm_medium
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,

    /// utm_campaign
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,

    /// utm_content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_content: Option<String>,
}

/// Per-recipient metadata, echoed back by the provider in webhook events
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientMetadata {
    /// The contact's full name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The contact id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<u64>,

    /// The email id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_id: Option<u64>,

    /// The email name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_name: Option<String>,

    /// The tracking hash for this send
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_id: Option<String>,

    /// Whether the hash is tracked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_id_state: Option<bool>,

    /// The source channel and its id, e.g. `("email", 5)`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<(String, u64)>,

    /// UTM tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_tags: Option<UtmTags>,
}

/// A contact the message is addressed to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// The recipient's address
    pub address: Address,

    /// Metadata about the recipient
    #[serde(default)]
    pub metadata: RecipientMetadata,

    /// Raw host tokens and their values for this recipient, e.g. `{contactfield=email}`
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
}

impl Recipient {
    /// Create a recipient without metadata or tokens
    pub fn new(address: Address) -> Self {
        Self {
            address,
            metadata: RecipientMetadata::default(),
            tokens: BTreeMap::new(),
        }
    }

    /// Adds a token value for this recipient
    pub fn with_token(mut self, token: &str, value: &str) -> Self {
        self.tokens.insert(token.to_string(), value.to_string());
        self
    }
}

/// A file attached to a message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// The file name
    pub name: String,

    /// The MIME type
    pub content_type: String,

    /// The raw file contents
    pub data: Vec<u8>,
}

/// A composed email message
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    /// The kind of send
    pub kind: MessageKind,

    /// The sender
    pub from: Option<Address>,

    /// The reply-to address
    pub reply_to: Option<Address>,

    /// The subject
    pub subject: String,

    /// The HTML body
    pub html: Option<String>,

    /// The plain text body
    pub text: Option<String>,

    /// Custom headers
    pub headers: BTreeMap<String, String>,

    /// The contacts to send to
    pub recipients: Vec<Recipient>,

    /// An address copied on every recipient's message
    pub bcc: Option<EmailAddress>,

    /// Provider tags
    pub tags: Vec<String>,

    /// UTM tags of the email
    pub utm_tags: Option<UtmTags>,

    /// The id of the email being sent, if any
    pub email_id: Option<u64>,

    /// Attachments
    pub attachments: Vec<Attachment>,

    /// Ask the provider to inline CSS
    pub inline_css: Option<bool>,
}

impl Message {
    /// A plain text message used to check a transport's configuration
    pub fn test_email(from: Address, to: Address) -> Self {
        Self {
            kind: MessageKind::Transactional,
            from: Some(from),
            subject: "Test email".to_string(),
            text: Some(
                "Hi! This is a test email. Testing...testing...1...2...3!".to_string(),
            ),
            recipients: vec![Recipient::new(to)],
            ..Self::default()
        }
    }

    /// The UTM campaign of the email, if tagged
    pub fn campaign_id(&self) -> Option<&str> {
        self.utm_tags.as_ref()?.utm_campaign.as_deref()
    }
}

/// The SMTP-level envelope of a send
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Sender used when the message itself has none
    pub sender: Option<Address>,
}

impl Envelope {
    /// Create an envelope with the given sender
    pub fn new(sender: Option<Address>) -> Self {
        Self { sender }
    }
}
