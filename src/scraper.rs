use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::config::ScraperConfig;
use crate::retry::RetryPolicy;
use crate::utils::error::{AppError, FetchError};

/// Retrieves raw page content for a product URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Plain HTTP GET with a per-attempt timeout and fixed-delay retries.
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            retry: RetryPolicy::from(config),
        })
    }

    pub fn with_client(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    async fn fetch_once(&self, url: Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transient(format!(
                "Failed to fetch {}: status code {}",
                url,
                status.as_u16()
            )));
        }

        response.text().await.map_err(FetchError::from_reqwest)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        self.retry.run(|| self.fetch_once(parsed.clone())).await
    }
}
