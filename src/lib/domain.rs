//! Provider-agnostic mail types and contracts

pub mod callbacks;
pub mod mailer;
