//! SparkPost HTTP client

use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

#[cfg(test)]
use mockall::mock;

use super::{
    parse_response, PreviewRequest, PreviewResults, SparkPostError, Transmission,
    TransmissionResults,
};

/// Path of the content previewer endpoint
pub const PREVIEW_PATH: &str = "/api/v1/utils/content-previewer/";

/// Path of the transmissions endpoint
pub const TRANSMISSIONS_PATH: &str = "/api/v1/transmissions/";

const HTTPS_PORT: u16 = 443;

/// The SparkPost endpoints used by the transport
#[async_trait]
pub trait SparkPostApi: Clone + Send + Sync + 'static {
    /// Renders content and substitution data through the content previewer
    ///
    /// # Arguments
    /// * `request` - The [`PreviewRequest`] holding the content and one recipient's data.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing the rendered [`PreviewResults`], or an
    /// [`Err`] containing a [`SparkPostError`] if the template does not render.
    async fn preview(&self, request: &PreviewRequest) -> Result<PreviewResults, SparkPostError>;

    /// Submits a transmission
    ///
    /// # Arguments
    /// * `transmission` - The [`Transmission`] payload.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing the [`TransmissionResults`], or an
    /// [`Err`] containing a [`SparkPostError`] if SparkPost refused it.
    async fn transmit(
        &self,
        transmission: &Transmission,
    ) -> Result<TransmissionResults, SparkPostError>;
}

#[cfg(test)]
mock! {
    pub SparkPostApi {}

    impl Clone for SparkPostApi {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl SparkPostApi for SparkPostApi {
        async fn preview(&self, request: &PreviewRequest) -> Result<PreviewResults, SparkPostError>;
        async fn transmit(&self, transmission: &Transmission) -> Result<TransmissionResults, SparkPostError>;
    }
}

/// A SparkPost API client bound to one host and API key
#[derive(Clone)]
pub struct SparkPostClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SparkPostClient {
    /// Creates a client. No request is made.
    pub fn new(http: reqwest::Client, host: &str, api_key: &str, port: Option<u16>) -> Self {
        let base_url = match port {
            None | Some(HTTPS_PORT) => format!("https://{host}"),
            Some(port) => format!("https://{host}:{port}"),
        };

        Self {
            http,
            base_url,
            api_key: api_key.to_string(),
        }
    }

    /// Creates a client for an explicit base URL, e.g. a proxy or a sandbox
    pub fn with_base_url(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// The base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, SparkPostError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        debug!(%url, "POST");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.api_key.as_str())
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        debug!(%url, status, "SparkPost responded");

        parse_response(status, &text)
    }
}

impl fmt::Debug for SparkPostClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparkPostClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .finish()
    }
}

#[async_trait]
impl SparkPostApi for SparkPostClient {
    async fn preview(&self, request: &PreviewRequest) -> Result<PreviewResults, SparkPostError> {
        self.post(PREVIEW_PATH, request).await
    }

    async fn transmit(
        &self,
        transmission: &Transmission,
    ) -> Result<TransmissionResults, SparkPostError> {
        self.post(TRANSMISSIONS_PATH, transmission).await
    }
}

/// Builds API clients for a host, API key and port
pub trait ClientFactory: Clone + Send + Sync + 'static {
    /// The client type produced
    type Client: SparkPostApi;

    /// Creates a client. No network I/O happens here.
    fn create(
        &self,
        host: &str,
        api_key: &str,
        port: Option<u16>,
    ) -> Result<Self::Client, SparkPostError>;
}

/// Builds [`SparkPostClient`]s over `reqwest`
#[derive(Clone, Debug)]
pub struct HttpClientFactory {
    timeout: Duration,
}

impl HttpClientFactory {
    /// Create a factory whose clients time out after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpClientFactory {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl ClientFactory for HttpClientFactory {
    type Client = SparkPostClient;

    fn create(
        &self,
        host: &str,
        api_key: &str,
        port: Option<u16>,
    ) -> Result<SparkPostClient, SparkPostError> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;

        Ok(SparkPostClient::new(http, host, api_key, port))
    }
}
