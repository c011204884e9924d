use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::config::DiscordConfig;
use crate::plugins::traits::Notifier;
use crate::utils::error::NotifyError;

/// Discord rejects message content longer than this.
const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
struct CurrentUser {
    username: String,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(default)]
    name: Option<String>,
}

/// Posts messages to a single channel through the Discord bot REST API.
pub struct DiscordNotifier {
    client: Client,
    config: DiscordConfig,
}

impl DiscordNotifier {
    /// Build a notifier whose requests give up after `config.timeout()`.
    pub fn new(config: DiscordConfig) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: DiscordConfig) -> Self {
        DiscordNotifier { client, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    fn channel_endpoint(&self) -> String {
        self.endpoint(&format!("channels/{}", self.config.channel_id.trim()))
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.config.token.trim())
    }

    fn create_message_payload(&self, text: &str) -> serde_json::Value {
        let content: String = if text.chars().count() > MAX_CONTENT_CHARS {
            text.chars().take(MAX_CONTENT_CHARS).collect()
        } else {
            text.to_string()
        };

        json!({ "content": content })
    }

    async fn check_status(&self, response: Response) -> Result<Response, NotifyError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(NotifyError::Unauthorized),
            StatusCode::NOT_FOUND => Err(NotifyError::ChannelNotFound(self.config.channel_id.clone())),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(NotifyError::Rejected {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &str {
        "discord"
    }

    async fn connect(&self) -> Result<(), NotifyError> {
        let response = self
            .client
            .get(self.endpoint("users/@me"))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await?;
        let user: CurrentUser = self.check_status(response).await?.json().await?;
        tracing::info!("Logged in as {}", user.username);

        let response = self
            .client
            .get(self.channel_endpoint())
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await?;
        let channel: Channel = self.check_status(response).await?.json().await?;
        tracing::info!(
            "Resolved channel {} ({})",
            self.config.channel_id,
            channel.name.as_deref().unwrap_or("unnamed")
        );

        Ok(())
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(format!("{}/messages", self.channel_endpoint()))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&self.create_message_payload(text))
            .send()
            .await?;

        self.check_status(response).await?;
        Ok(())
    }
}
