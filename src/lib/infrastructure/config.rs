//! Transport configuration

use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::{
    domain::mailer::TrackingSettings,
    infrastructure::sparkpost::{
        FactoryError, HttpClientFactory, SparkPostClient, SparkPostTransport,
        SparkPostTransportFactory, WebhookAuth,
    },
};

/// SparkPost mailer configuration
#[derive(Clone, Debug, Parser)]
pub struct MailerConfig {
    /// The mailer DSN, e.g. `mautic+sparkpost+api://:API_KEY@default?region=us`
    #[arg(long, env = "MAILER_DSN")]
    pub dsn: String,

    /// Track opens on bulk sends
    #[arg(long, env = "MAILER_OPEN_TRACKING", action = ArgAction::Set, default_value_t = false)]
    pub open_tracking: bool,

    /// Track clicks on bulk sends
    #[arg(long, env = "MAILER_CLICK_TRACKING", action = ArgAction::Set, default_value_t = false)]
    pub click_tracking: bool,

    /// Request timeout for SparkPost API calls, in seconds
    #[arg(long, env = "SPARKPOST_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl MailerConfig {
    /// The tracking flags applied to bulk sends
    pub fn tracking(&self) -> TrackingSettings {
        TrackingSettings {
            open_tracking: self.open_tracking,
            click_tracking: self.click_tracking,
        }
    }

    /// Builds a transport from the configured DSN
    pub fn transport(&self) -> Result<SparkPostTransport<SparkPostClient>, FactoryError> {
        let clients = HttpClientFactory::new(Duration::from_secs(self.timeout_secs));

        SparkPostTransportFactory::new(clients, self.tracking()).create_from_str(&self.dsn)
    }
}

/// Webhook configuration
#[derive(Clone, Debug, Parser)]
pub struct WebhookConfig {
    /// Basic-auth user configured on the SparkPost webhook
    #[arg(long, env = "SPARKPOST_WEBHOOK_USER")]
    pub webhook_user: Option<String>,

    /// Basic-auth password configured on the SparkPost webhook
    #[arg(long, env = "SPARKPOST_WEBHOOK_PASSWORD")]
    pub webhook_password: Option<String>,
}

impl WebhookConfig {
    /// The credentials webhook requests must carry, when both are configured
    pub fn auth(&self) -> Option<WebhookAuth> {
        match (&self.webhook_user, &self.webhook_password) {
            (Some(user), Some(password)) => Some(WebhookAuth::new(user, password)),
            _ => None,
        }
    }
}
