use anyhow::{anyhow, bail, Result};
use bytes::Bytes;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

mod limiter;
pub mod robots;

use limiter::RateLimiter;
use robots::RobotsCache;

pub const USER_AGENT: &str = "civic-ingest/0.1 (civic transparency crawler)";

/// Backoff schedule for 429/5xx responses; after the last retry the error
/// propagates to the caller.
const RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_per_minute: usize,
    /// Content-Length cap for document downloads (PDFs).
    pub max_document_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            max_per_minute: 20,
            max_document_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Rate-limited, retrying HTTP client for municipal sites.
pub struct Fetcher {
    client: Client,
    limiter: RateLimiter,
    robots: RobotsCache,
    max_document_bytes: u64,
}

impl Fetcher {
    pub fn new(cfg: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(cfg.timeout)
            .build()?;
        Ok(Self {
            client,
            limiter: RateLimiter::new(cfg.max_per_minute),
            robots: RobotsCache::new("civic-ingest"),
            max_document_bytes: cfg.max_document_bytes,
        })
    }

    /// Fetch a listing/detail page as text.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self.get_with_retry(url).await?;
        Ok(resp.text().await?)
    }

    /// Fetch a document (PDF), refusing anything over the size cap.
    pub async fn get_document(&self, url: &str) -> Result<Bytes> {
        let resp = self.get_with_retry(url).await?;
        if let Some(len) = resp.content_length() {
            if len > self.max_document_bytes {
                bail!("document too large: {} bytes at {}", len, url);
            }
        }
        Ok(resp.bytes().await?)
    }

    async fn get_with_retry(&self, url: &str) -> Result<Response> {
        let parsed = Url::parse(url)?;

        if !self.robots.allows(&self.client, &parsed).await {
            bail!("blocked by robots.txt: {}", url);
        }

        let host = parsed.host_str().unwrap_or("unknown").to_string();

        let mut last_err: Option<anyhow::Error> = None;
        for attempt in 0..=RETRY_DELAYS.len() {
            self.limiter.acquire(&host).await;

            match self.client.get(url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) if is_retryable(resp.status()) => {
                    last_err = Some(anyhow!("http {} from {}", resp.status(), url));
                }
                Ok(resp) => {
                    bail!("http {} from {}", resp.status(), url);
                }
                Err(e) => {
                    last_err = Some(e.into());
                }
            }

            if attempt < RETRY_DELAYS.len() {
                tracing::warn!(url, attempt = attempt + 1, "retrying fetch");
                tokio::time::sleep(RETRY_DELAYS[attempt]).await;
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("fetch failed: {}", url)))
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::NOT_FOUND));
        assert!(!is_retryable(StatusCode::FORBIDDEN));
    }
}
