//! Digest delivery.
//!
//! Messages go to a Telegram chat through the Bot API, or, in dry-run mode,
//! only to the log.

mod client;

use tracing::info;

pub use client::TelegramClient;

use crate::config::TelegramConfig;
use crate::logging::DRY_RUN_TARGET;
use crate::Result;

/// Where digest chunks are delivered.
pub enum Delivery {
    /// Post to Telegram.
    Telegram(TelegramClient),
    /// Log each chunk without any network call.
    DryRun,
}

impl Delivery {
    /// Build the delivery target selected by the configuration.
    pub fn from_config(config: &TelegramConfig) -> Result<Self> {
        if config.dry_run {
            Ok(Self::DryRun)
        } else {
            Ok(Self::Telegram(TelegramClient::new(config)?))
        }
    }

    /// Check whether this is dry-run delivery.
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun)
    }

    /// Deliver one chunk.
    pub async fn send(&self, text: &str) -> Result<()> {
        match self {
            Self::Telegram(client) => client.send_message(text).await,
            Self::DryRun => {
                info!(
                    target: DRY_RUN_TARGET,
                    "\n----- DRY RUN MESSAGE START -----\n{}\n----- DRY RUN MESSAGE END -----",
                    text
                );
                Ok(())
            }
        }
    }
}
