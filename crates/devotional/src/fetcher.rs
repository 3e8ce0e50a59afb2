use crate::config::Config;

use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },
    #[error("Giving up on {url} after {attempts} attempt(s): {source}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Box<FetchError>,
    },
}

/// A single GET of a page body. Retrying is layered on top by [`fetch_with_retry`].
pub trait Fetch {
    fn get(&self, url: &str) -> impl Future<Output = Result<String, FetchError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub attempts: u32,
    /// Pause between a failed attempt and the next one.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::debug!("HTTP error: {e:?}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response
            .text()
            .await
            .inspect_err(|e| log::debug!("Decode error: {e:?}"))?)
    }
}

/// Fetches `url`, retrying failed attempts up to `policy.attempts` times in total.
pub async fn fetch_with_retry<F: Fetch>(
    fetcher: &F,
    url: &str,
    policy: &RetryPolicy,
) -> Result<String, FetchError> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        log::info!("Fetching {} (attempt {})", url, attempt);

        match fetcher.get(url).await {
            Ok(html) => return Ok(html),
            Err(e) if attempt < attempts => {
                log::warn!("Attempt {} failed: {}", attempt, e);
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => {
                log::warn!("Attempt {} failed: {}", attempt, e);
                return Err(FetchError::RetriesExhausted {
                    url: url.to_string(),
                    attempts,
                    source: Box::new(e),
                });
            }
        }
    }
}
