//! In-memory `PageFetcher` that scripts responses per URL and counts calls.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reprint_core::fetch::{FetchError, FetchResult, NetworkFault, PageFetcher};

/// Scripted reply for one URL.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Reply {
    /// 200 response whose final URL is `final_url` with the given body.
    Page { final_url: String, body: Vec<u8> },
    /// A connection reset on every call.
    Reset,
    /// A connection refused on every call.
    Refused,
}

/// Stub fetcher keyed by exact request URL. Unknown URLs are refused.
#[derive(Debug, Default)]
pub struct StubFetcher {
    replies: HashMap<String, Reply>,
    calls: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for `url` without a redirect.
    pub fn page(self, url: &str, body: &str) -> Self {
        self.redirect(url, url, body)
    }

    /// Serves `body` for `url` as if redirected to `final_url`.
    pub fn redirect(mut self, url: &str, final_url: &str, body: &str) -> Self {
        self.replies.insert(
            url.to_string(),
            Reply::Page {
                final_url: final_url.to_string(),
                body: body.as_bytes().to_vec(),
            },
        );
        self
    }

    /// Serves raw bytes for `url`.
    pub fn bytes(mut self, url: &str, body: &[u8]) -> Self {
        self.replies.insert(
            url.to_string(),
            Reply::Page {
                final_url: url.to_string(),
                body: body.to_vec(),
            },
        );
        self
    }

    pub fn reply(mut self, url: &str, reply: Reply) -> Self {
        self.replies.insert(url.to_string(), reply);
        self
    }

    /// Total number of fetches made.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of fetches made for `url`.
    pub fn calls_to(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|requested| requested.as_str() == url)
            .count()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(url.to_string());
        match self.replies.get(url) {
            Some(Reply::Page { final_url, body }) => {
                Ok(FetchResult::new(final_url.clone(), 200, body.clone()))
            }
            Some(Reply::Reset) => Err(FetchError::network_with_fault(
                url,
                NetworkFault::ConnectionReset,
                io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer"),
            )),
            Some(Reply::Refused) | None => Err(FetchError::network_with_fault(
                url,
                NetworkFault::Connect,
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            )),
        }
    }
}
