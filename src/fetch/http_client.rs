//! `reqwest`-backed [`PageFetcher`].
//!
//! The client is built once per run and shared; it follows redirects with the
//! default policy, decompresses gzip, and sends the configured browser
//! User-Agent on every request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, instrument};

use super::{FetchError, FetchResult, PageFetcher};

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default total request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const ACCEPT_ANY_DOCUMENT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,application/pdf,*/*;q=0.8";

/// HTTP fetcher shared by all identifiers in a run.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the client cannot be constructed.
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        Self::with_timeouts(user_agent, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS)
    }

    /// Builds a fetcher with explicit timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the client cannot be constructed.
    #[instrument(level = "debug", skip(user_agent))]
    pub fn with_timeouts(
        user_agent: &str,
        connect_timeout_secs: u64,
        timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .gzip(true)
            .build()
            .map_err(|error| FetchError::ClientBuild {
                reason: error.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(FetchError::invalid_url(url));
        }

        let response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_ANY_DOCUMENT)
            .send()
            .await
            .map_err(|error| FetchError::from_reqwest(url, error))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|error| FetchError::from_reqwest(url, error))?;

        debug!(status, final_url = %final_url, bytes = body.len(), "fetched");
        Ok(FetchResult::new(final_url, status, body.to_vec()))
    }
}
