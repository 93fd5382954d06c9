//! Single-shot retrieval of raw feed content.
//!
//! Every failure (connect, timeout, status, body) collapses to `None`; the
//! classification is only logged.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use macau_core::{FeedsConfig, ReqwestErrorExt};
use reqwest::Client;

use crate::error::FeedError;

/// Retrieves the raw text at a URL.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Option<String>> + Send;
}

/// HTTP fetcher with a hard per-request timeout
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Arc<Client>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub fn from_config(config: &FeedsConfig) -> Result<Self, FeedError> {
        Self::new(Duration::from_secs(config.timeout_secs), &config.user_agent)
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Fetch of {} failed: {}", url, e.into_network_error());
                return None;
            }
        };

        if let Err(e) = response.error_for_status_ref() {
            tracing::debug!("Fetch of {} failed: {}", url, e.into_network_error());
            return None;
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reading body of {} failed: {}", url, e.into_network_error());
                return None;
            }
        };

        if body.is_empty() {
            tracing::debug!("Fetch of {} returned an empty body", url);
            return None;
        }

        Some(body)
    }
}

impl<F: Fetcher> Fetcher for Arc<F> {
    fn fetch(&self, url: &str) -> impl Future<Output = Option<String>> + Send {
        (**self).fetch(url)
    }
}
