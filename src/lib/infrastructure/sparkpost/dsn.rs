//! Connection descriptors

use std::{collections::BTreeMap, fmt, str::FromStr};

use percent_encoding::percent_decode_str;
use url::Url;

use super::DsnError;

/// The scheme SparkPost API descriptors use
pub const SPARKPOST_API_SCHEME: &str = "mautic+sparkpost+api";

/// A SparkPost region
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    /// United States
    Us,

    /// European Union
    Eu,
}

impl Region {
    /// The API host serving this region
    pub fn host(&self) -> &'static str {
        match self {
            Region::Us => "api.sparkpost.com",
            Region::Eu => "api.eu.sparkpost.com",
        }
    }

    /// The region's option value
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Eu => "eu",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = DsnError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "" => Err(DsnError::EmptyRegion),
            "us" => Ok(Region::Us),
            "eu" => Ok(Region::Eu),
            other => Err(DsnError::InvalidRegion(other.to_string())),
        }
    }
}

/// Validates a region as entered on a configuration form.
///
/// A missing value is treated as empty.
pub fn validate_region(value: Option<&str>) -> Result<Region, DsnError> {
    value.unwrap_or_default().parse()
}

/// Decodes a percent-encoded user or password; empty values become `None`
fn decode_credential(raw: &str) -> Result<Option<String>, DsnError> {
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|e| DsnError::InvalidDsn(format!("credentials are not valid UTF-8: {e}")))?;

    Ok(Some(decoded.into_owned()).filter(|value| !value.is_empty()))
}

/// A parsed connection descriptor, e.g.
/// `mautic+sparkpost+api://:API_KEY@default?region=us`
#[derive(Clone, PartialEq, Eq)]
pub struct Dsn {
    scheme: String,
    host: String,
    user: Option<String>,
    password: Option<String>,
    port: Option<u16>,
    options: BTreeMap<String, String>,
}

impl Dsn {
    /// Create a descriptor from its parts
    pub fn new(
        scheme: &str,
        host: &str,
        user: Option<&str>,
        password: Option<&str>,
        port: Option<u16>,
        options: BTreeMap<String, String>,
    ) -> Self {
        Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            user: user.map(str::to_string),
            password: password.map(str::to_string),
            port,
            options,
        }
    }

    /// Parses a descriptor string
    pub fn parse(raw: &str) -> Result<Self, DsnError> {
        let url = Url::parse(raw.trim())?;

        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| DsnError::InvalidDsn(format!("\"{raw}\" has no host")))?;

        let user = decode_credential(url.username())?;
        let password = url.password().map(decode_credential).transpose()?.flatten();
        let options = url.query_pairs().into_owned().collect();

        Ok(Self::new(
            url.scheme(),
            host,
            user.as_deref(),
            password.as_deref(),
            url.port(),
            options,
        ))
    }

    /// The scheme
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// A query option
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// The API key: the password, or the user when there is no password
    pub fn api_key(&self) -> Result<&str, DsnError> {
        [self.password.as_deref(), self.user.as_deref()]
            .into_iter()
            .flatten()
            .find(|key| !key.is_empty())
            .ok_or(DsnError::MissingApiKey)
    }

    /// The `region` option
    pub fn region(&self) -> Result<Region, DsnError> {
        validate_region(self.option("region"))
    }
}

impl FromStr for Dsn {
    type Err = DsnError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl fmt::Debug for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dsn")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("user", &self.user.as_ref().map(|_| "[redacted]"))
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("port", &self.port)
            .field("options", &self.options)
            .finish()
    }
}
