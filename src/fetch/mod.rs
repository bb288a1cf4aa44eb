//! HTTP fetching for redirector, landing and document requests.
//!
//! - [`PageFetcher`] - Async trait used by the resolver and finders for every GET
//! - [`HttpFetcher`] - `reqwest`-backed implementation with browser User-Agent
//! - [`FetchResult`] - Final URL, status and raw body of one GET
//! - [`FetchError`] - Structured errors with transient-fault classification

mod error;
mod http_client;

pub use error::{BoxError, FetchError, NetworkFault, classify_source_chain};
pub use http_client::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS, HttpFetcher};

use async_trait::async_trait;
use url::Url;

/// Raw response of a single HTTP GET after redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// Final URL after following redirects.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl FetchResult {
    /// Creates a fetch result.
    #[must_use]
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx status codes.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the final URL, if it is a valid absolute URL.
    #[must_use]
    pub fn parsed_url(&self) -> Option<Url> {
        Url::parse(&self.url).ok()
    }
}

/// Performs HTTP GETs on behalf of the resolver and finders.
///
/// Implementations carry the request headers (notably the User-Agent), so
/// callers only supply the URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`, following redirects, and returns the final response.
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError>;
}
