use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{FetchError, PageSource, StaticPage};
use crate::config::FetchConfig;

/// HTTP-backed page source shared by a whole run: one client, cookies kept,
/// bounded timeout, retry with backoff on rate-limit responses.
pub struct HttpPageSource {
    inner: reqwest::Client,
    config: FetchConfig,
}

impl HttpPageSource {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            inner,
            config: config.clone(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let mut last_err = FetchError::Request {
            url: url.to_string(),
            message: "no attempts made".to_string(),
        };

        for attempt in 1..=(self.config.max_retries + 1) {
            debug!("GET {} (attempt {})", url, attempt);

            match self.inner.get(url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp.text().await.map_err(|e| FetchError::Request {
                            url: url.to_string(),
                            message: format!("failed to read body: {}", e),
                        });
                    } else if status.as_u16() == 429 || status.as_u16() == 503 {
                        // Rate limited — back off harder
                        let backoff = Duration::from_millis(
                            self.config.retry_backoff_ms * (2u64.pow(attempt)),
                        );
                        warn!(
                            "Rate limited ({}) on attempt {}, sleeping {:?}",
                            status, attempt, backoff
                        );
                        sleep(backoff).await;
                        last_err = FetchError::Status {
                            status: status.as_u16(),
                            url: url.to_string(),
                        };
                    } else {
                        // Don't retry other 4xx/5xx
                        return Err(FetchError::Status {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }
                }
                Err(e) if e.is_timeout() => {
                    return Err(FetchError::Timeout {
                        url: url.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Request failed on attempt {}: {}", attempt, e);
                    last_err = FetchError::Request {
                        url: url.to_string(),
                        message: e.to_string(),
                    };
                    let backoff =
                        Duration::from_millis(self.config.retry_backoff_ms * attempt as u64);
                    sleep(backoff).await;
                }
            }
        }

        Err(last_err)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, url: &str) -> Result<StaticPage, FetchError> {
        let html = self.get_text(url).await?;
        Ok(StaticPage::parse(&html))
    }
}
