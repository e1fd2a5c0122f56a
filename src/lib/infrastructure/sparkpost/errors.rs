//! SparkPost errors

use thiserror::Error;
use tracing::debug;

use crate::domain::callbacks::CallbackError;

/// Errors raised while talking to the SparkPost API
#[derive(Debug, Error)]
pub enum SparkPostError {
    /// The request could not be sent or its response could not be read
    #[error("request to SparkPost failed: {0}")]
    Request(#[from] reqwest::Error),

    /// SparkPost answered with a non-2xx status or an error body
    #[error("SparkPost returned {status}: {message}")]
    Api {
        /// The HTTP status code
        status: u16,

        /// The provider's error messages
        message: String,
    },

    /// The response body was not the JSON SparkPost documents
    #[error("malformed SparkPost response: {0}")]
    MalformedResponse(String),
}

impl From<serde_json::Error> for SparkPostError {
    fn from(err: serde_json::Error) -> Self {
        debug!("serde_json::Error -> SparkPostError");

        SparkPostError::MalformedResponse(err.to_string())
    }
}

/// Errors in a connection descriptor
#[derive(Debug, Error)]
pub enum DsnError {
    /// The descriptor could not be parsed
    #[error("invalid DSN: {0}")]
    InvalidDsn(String),

    /// No region was given
    #[error("The region must not be empty.")]
    EmptyRegion,

    /// The region is not one SparkPost serves
    #[error("The region \"{0}\" is not supported. Use one of: us, eu.")]
    InvalidRegion(String),

    /// Neither the user nor the password carries an API key
    #[error("the DSN does not contain a SparkPost API key")]
    MissingApiKey,
}

impl DsnError {
    /// The validator translation key for errors shown on configuration forms
    pub fn translation_key(&self) -> Option<&'static str> {
        match self {
            DsnError::EmptyRegion => Some("mautic.sparkpost.plugin.region.empty"),
            DsnError::InvalidRegion(_) => Some("mautic.sparkpost.plugin.region.invalid"),
            DsnError::InvalidDsn(_) | DsnError::MissingApiKey => None,
        }
    }
}

impl From<url::ParseError> for DsnError {
    fn from(err: url::ParseError) -> Self {
        debug!("url::ParseError -> DsnError");

        DsnError::InvalidDsn(err.to_string())
    }
}

/// Errors raised while building a transport from a descriptor
#[derive(Debug, Error)]
pub enum FactoryError {
    /// The descriptor's scheme is not handled by this factory
    #[error("the \"{scheme}\" scheme is not supported; supported schemes for mailer \"sparkpost\" are: \"mautic+sparkpost+api\"")]
    UnsupportedScheme {
        /// The rejected scheme
        scheme: String,
    },

    /// The descriptor is invalid
    #[error(transparent)]
    Dsn(#[from] DsnError),

    /// The HTTP client could not be built
    #[error(transparent)]
    Client(#[from] SparkPostError),
}

/// Errors raised while processing a webhook delivery
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The payload is not a SparkPost event batch
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// The request's credentials did not match
    #[error("webhook credentials do not match")]
    Unauthorized,

    /// The host handler failed
    #[error(transparent)]
    HandlerError(#[from] CallbackError),
}
