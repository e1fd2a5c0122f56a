//! Email addresses

use std::{fmt, str::FromStr};

use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use EmailAddressError::*;

/// An error that can occur when creating an email address
#[derive(Debug, Error)]
pub enum EmailAddressError {
    /// The email address is empty
    #[error("email is empty")]
    EmptyEmailAddress,

    /// The email address is invalid
    #[error("email is invalid")]
    InvalidEmailAddress,

    /// The display name contains control characters
    #[error("display name contains control characters")]
    InvalidDisplayName,
}

impl From<lettre::address::AddressError> for EmailAddressError {
    fn from(_err: lettre::address::AddressError) -> Self {
        InvalidEmailAddress
    }
}

/// An email address
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new email address
    pub fn new(raw: &str) -> Result<Self, EmailAddressError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(EmptyEmailAddress);
        }

        lettre::Address::from_str(trimmed)?;

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailAddressError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(&raw)
    }
}

impl FromStr for EmailAddress {
    type Err = EmailAddressError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::new(raw)
    }
}

/// An email address with an optional display name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AddressParts")]
pub struct Address {
    email: EmailAddress,
    name: Option<String>,
}

#[derive(Deserialize)]
struct AddressParts {
    email: EmailAddress,

    #[serde(default)]
    name: Option<String>,
}

impl TryFrom<AddressParts> for Address {
    type Error = EmailAddressError;

    fn try_from(parts: AddressParts) -> Result<Self, Self::Error> {
        Self::new(parts.email, parts.name.as_deref())
    }
}

impl Address {
    /// Create a new address.
    ///
    /// Blank names are dropped; names containing control characters such as CR or LF
    /// are rejected so they cannot end up in a header.
    pub fn new(email: EmailAddress, name: Option<&str>) -> Result<Self, EmailAddressError> {
        let name = name.map(str::trim).filter(|name| !name.is_empty());

        if name.is_some_and(|name| name.chars().any(char::is_control)) {
            return Err(InvalidDisplayName);
        }

        Ok(Self {
            email,
            name: name.map(str::to_string),
        })
    }

    /// The email address
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// The display name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The display name, or an empty string when there is none
    pub fn name_or_empty(&self) -> &str {
        self.name().unwrap_or_default()
    }

    /// The address as a lettre [`Mailbox`], ready to be rendered into a header
    pub fn mailbox(&self) -> Result<Mailbox, EmailAddressError> {
        let email = lettre::Address::from_str(self.email.as_str())?;

        Ok(Mailbox::new(self.name.clone(), email))
    }
}

impl From<EmailAddress> for Address {
    fn from(email: EmailAddress) -> Self {
        Self { email, name: None }
    }
}
