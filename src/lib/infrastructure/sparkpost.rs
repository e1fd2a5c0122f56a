//! SparkPost adapter: HTTP client, payload mapping, transport and webhook parsing.

mod client;
mod dsn;
mod errors;
mod factory;
mod payload;
mod response;
mod transport;
mod webhook;

pub use client::{
    ClientFactory, HttpClientFactory, SparkPostApi, SparkPostClient, PREVIEW_PATH,
    TRANSMISSIONS_PATH,
};
pub use dsn::{validate_region, Dsn, Region, SPARKPOST_API_SCHEME};
pub use errors::{DsnError, FactoryError, SparkPostError, WebhookError};
pub use factory::SparkPostTransportFactory;
pub use payload::{
    build_transmission, AddressPayload, AttachmentPayload, Content, PreviewRequest,
    RecipientPayload, Transmission,
};
pub use response::{parse_response, ApiErrorDetail, PreviewResults, TransmissionResults};
pub use transport::SparkPostTransport;
pub use webhook::{parse_events, WebhookAuth, WebhookProcessor};
