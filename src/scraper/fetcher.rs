//! HTTP fetcher for the race calendar page.

use reqwest::Client;
use std::time::Duration;

use super::ScrapeError;
use crate::config::ScraperConfig;
use crate::retry::{retry_if, RetryConfig};

/// Fetches the race calendar with retry on transient server errors
pub struct Fetcher {
    client: Client,
    url: String,
    retry: RetryConfig,
}

impl Fetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            retry: config.retry_config(),
        })
    }

    /// Fetch the page body.
    ///
    /// Retries on 500/502/503/504 only. Transport errors, timeouts and any
    /// other status fail right away.
    pub async fn fetch_page(&self) -> Result<String, ScrapeError> {
        retry_if(
            &self.retry,
            "fetch race calendar",
            || self.fetch_once(),
            ScrapeError::is_transient,
        )
        .await
    }

    async fn fetch_once(&self) -> Result<String, ScrapeError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                status: status.as_u16(),
            });
        }

        // Decode as UTF-8 whatever charset the server claims
        let bytes = response.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
