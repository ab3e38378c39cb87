use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::debug;

use crate::config::TelegramConfig;
use crate::{DigestError, Result};

/// Telegram Bot API client
pub struct TelegramClient {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
    disable_link_preview: bool,
}

impl TelegramClient {
    /// Create a new Telegram client from the delivery configuration
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DigestError::Delivery(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            disable_link_preview: config.disable_link_preview,
        })
    }

    /// Send an HTML-formatted text message
    ///
    /// Anything other than HTTP 200 is an error carrying the response body.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);

        let resp = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "HTML",
                "disable_web_page_preview": self.disable_link_preview,
            }))
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(DigestError::Delivery(format!(
                "Telegram API error {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        debug!("Delivered message ({} chars)", text.chars().count());
        Ok(())
    }
}
