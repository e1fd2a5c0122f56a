//! Mailer module: messages, addresses and the transport contract.

mod address;
mod errors;
mod message;
mod options;
mod receipt;
mod report;
mod tokens;
mod transport;

pub use address::{Address, EmailAddress, EmailAddressError};
pub use errors::TransportError;
pub use message::{
    Attachment, Envelope, Message, MessageKind, Recipient, RecipientMetadata, UtmTags,
};
pub use options::{SendOptions, TrackingSettings};
pub use receipt::SendReceipt;
pub use report::{send_batch, BatchStats};
pub use tokens::{normalize_token, placeholder, SubstitutionData, TokenMap};
pub use transport::Transport;

#[cfg(test)]
pub mod tests {
    pub use super::transport::MockTransport;
}
