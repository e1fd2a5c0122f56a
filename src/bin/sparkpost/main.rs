#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Command-line interface for the SparkPost transport

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use sparkpost_transport::{
    domain::{
        callbacks::{CallbackError, CallbackHandler, DeliveryEvent},
        mailer::{send_batch, Address, EmailAddress, Envelope, Message, Transport},
    },
    infrastructure::{
        config::{MailerConfig, WebhookConfig},
        sparkpost::WebhookProcessor,
    },
};
use tracing::info;

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send the messages described in a JSON file
    Send {
        /// The mailer configuration
        #[clap(flatten)]
        mailer: MailerConfig,

        /// Path to a JSON message, or an array of messages
        #[arg(long)]
        message: PathBuf,
    },

    /// Send a test email to check the configuration
    Test {
        /// The mailer configuration
        #[clap(flatten)]
        mailer: MailerConfig,

        /// The sender address
        #[arg(long, env = "MAILER_FROM_EMAIL")]
        from: String,

        /// The sender name
        #[arg(long, env = "MAILER_FROM_NAME")]
        from_name: Option<String>,

        /// The address to send the test email to
        #[arg(long)]
        to: String,
    },

    /// Process a SparkPost webhook payload
    Webhook {
        /// The webhook configuration
        #[clap(flatten)]
        webhook: WebhookConfig,

        /// Path to the JSON payload SparkPost posted
        #[arg(long)]
        payload: PathBuf,

        /// The request's `Authorization` header
        #[arg(long)]
        authorization: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Messages {
    Many(Vec<Message>),
    One(Box<Message>),
}

/// Logs delivery events instead of recording them
#[derive(Debug)]
struct LoggingHandler;

#[async_trait]
impl CallbackHandler for LoggingHandler {
    async fn handle(&self, event: &DeliveryEvent) -> Result<(), CallbackError> {
        info!(
            transmission_id = event.transmission_id.as_deref().unwrap_or_default(),
            recipient = %event.recipient,
            kind = ?event.kind,
            "delivery event"
        );

        Ok(())
    }
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    match args.command {
        Command::Send { mailer, message } => {
            let raw = std::fs::read_to_string(&message)
                .with_context(|| format!("failed to read {}", message.display()))?;

            let messages = match serde_json::from_str(&raw)? {
                Messages::Many(messages) => messages,
                Messages::One(message) => vec![*message],
            };

            let stats = send_batch(&mailer.transport()?, &messages, &Envelope::default()).await;

            println!("{}", serde_json::to_string(&stats)?);
        }
        Command::Test {
            mailer,
            from,
            from_name,
            to,
        } => {
            let from = Address::new(EmailAddress::new(&from)?, from_name.as_deref())?;
            let to = Address::from(EmailAddress::new(&to)?);

            let receipt = mailer
                .transport()?
                .send(&Message::test_email(from, to), &Envelope::default())
                .await?;

            println!("{}", serde_json::to_string(&receipt)?);
        }
        Command::Webhook {
            webhook,
            payload,
            authorization,
        } => {
            let raw = std::fs::read(&payload)
                .with_context(|| format!("failed to read {}", payload.display()))?;

            let processor = WebhookProcessor::new(Arc::new(LoggingHandler), webhook.auth());
            let handled = processor.process(authorization.as_deref(), &raw).await?;

            println!("{handled} events handled");
        }
    }

    Ok(())
}
