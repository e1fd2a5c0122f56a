//! Transport factory

use tracing::debug;

use crate::domain::mailer::TrackingSettings;

use super::{ClientFactory, Dsn, FactoryError, SparkPostTransport, SPARKPOST_API_SCHEME};

/// Builds [`SparkPostTransport`]s from connection descriptors
#[derive(Debug, Clone)]
pub struct SparkPostTransportFactory<F>
where
    F: ClientFactory,
{
    clients: F,
    tracking: TrackingSettings,
}

impl<F> SparkPostTransportFactory<F>
where
    F: ClientFactory,
{
    /// Create a new factory
    pub fn new(clients: F, tracking: TrackingSettings) -> Self {
        Self { clients, tracking }
    }

    /// Whether the descriptor's scheme is handled by this factory
    pub fn supports(&self, dsn: &Dsn) -> bool {
        dsn.scheme() == SPARKPOST_API_SCHEME
    }

    /// Creates a transport for the descriptor.
    ///
    /// The client always talks HTTPS to the region's API host; the descriptor's own
    /// host and port only identify the configuration.
    ///
    /// # Errors
    /// - [`FactoryError::UnsupportedScheme`] when the scheme is not
    ///   [`SPARKPOST_API_SCHEME`].
    /// - [`FactoryError::Dsn`] when the API key or region is missing or invalid.
    pub fn create(&self, dsn: &Dsn) -> Result<SparkPostTransport<F::Client>, FactoryError> {
        if !self.supports(dsn) {
            return Err(FactoryError::UnsupportedScheme {
                scheme: dsn.scheme().to_string(),
            });
        }

        let api_key = dsn.api_key()?;
        let region = dsn.region()?;

        debug!(%region, "creating SparkPost transport");

        let client = self.clients.create(region.host(), api_key, None)?;

        Ok(SparkPostTransport::new(client, self.tracking))
    }

    /// Parses a descriptor string and creates a transport for it
    pub fn create_from_str(
        &self,
        dsn: &str,
    ) -> Result<SparkPostTransport<F::Client>, FactoryError> {
        self.create(&Dsn::parse(dsn)?)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        sync::{Arc, Mutex},
    };

    use testresult::TestResult;

    use crate::infrastructure::sparkpost::{
        tests::MockSparkPostApi, DsnError, HttpClientFactory, SparkPostError,
    };

    use super::*;

    type Calls = Arc<Mutex<Vec<(String, String, Option<u16>)>>>;

    /// Records the arguments it was called with instead of building HTTP clients
    #[derive(Clone, Default)]
    struct RecordingClientFactory {
        calls: Calls,
    }

    impl ClientFactory for RecordingClientFactory {
        type Client = MockSparkPostApi;

        fn create(
            &self,
            host: &str,
            api_key: &str,
            port: Option<u16>,
        ) -> Result<MockSparkPostApi, SparkPostError> {
            self.calls
                .lock()
                .unwrap()
                .push((host.to_string(), api_key.to_string(), port));

            Ok(MockSparkPostApi::new())
        }
    }

    fn dsn(scheme: &str, region: &str) -> Dsn {
        let mut options = BTreeMap::new();
        options.insert("region".to_string(), region.to_string());

        Dsn::new(scheme, "host", None, Some("sparkpost_api_key"), None, options)
    }

    #[test]
    fn test_create_transport() -> TestResult {
        let clients = RecordingClientFactory::default();
        let factory = SparkPostTransportFactory::new(clients.clone(), TrackingSettings::default());

        factory.create(&dsn(SPARKPOST_API_SCHEME, "us"))?;

        assert_eq!(
            *clients.calls.lock().unwrap(),
            vec![(
                "api.sparkpost.com".to_string(),
                "sparkpost_api_key".to_string(),
                None
            )]
        );

        Ok(())
    }

    #[test]
    fn test_create_transport_for_eu() -> TestResult {
        let clients = RecordingClientFactory::default();
        let factory = SparkPostTransportFactory::new(clients.clone(), TrackingSettings::default());

        factory.create(&dsn(SPARKPOST_API_SCHEME, "eu"))?;

        assert_eq!(clients.calls.lock().unwrap()[0].0, "api.eu.sparkpost.com");

        Ok(())
    }

    #[test]
    fn test_unsupported_scheme() {
        let clients = RecordingClientFactory::default();
        let factory = SparkPostTransportFactory::new(clients.clone(), TrackingSettings::default());

        let result = factory.create(&dsn("some+unsupported+scheme", "us"));

        assert!(matches!(
            result,
            Err(FactoryError::UnsupportedScheme { scheme }) if scheme == "some+unsupported+scheme"
        ));
        assert!(clients.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_region() {
        let factory = SparkPostTransportFactory::new(
            RecordingClientFactory::default(),
            TrackingSettings::default(),
        );

        let result = factory.create(&dsn(SPARKPOST_API_SCHEME, "invalid_region"));

        assert!(matches!(
            result,
            Err(FactoryError::Dsn(DsnError::InvalidRegion(_)))
        ));
    }

    #[test]
    fn test_create_from_str_with_http_clients() -> TestResult {
        let tracking = TrackingSettings {
            open_tracking: true,
            click_tracking: false,
        };
        let factory = SparkPostTransportFactory::new(HttpClientFactory::default(), tracking);

        let transport =
            factory.create_from_str("mautic+sparkpost+api://:some_api@some_host:25?region=us")?;

        assert_eq!(transport.tracking(), tracking);

        Ok(())
    }

    #[test]
    fn test_create_from_str_rejects_garbage() {
        let factory = SparkPostTransportFactory::new(
            HttpClientFactory::default(),
            TrackingSettings::default(),
        );

        assert!(matches!(
            factory.create_from_str("::"),
            Err(FactoryError::Dsn(DsnError::InvalidDsn(_)))
        ));
    }
}
