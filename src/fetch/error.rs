//! Error types for HTTP fetches, with transient-fault classification.
//!
//! Retry decisions depend on an enumerated [`NetworkFault`] derived by walking
//! the error's source chain, never on message text.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use thiserror::Error;

/// Boxed source error carried by network failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Category of a network-layer failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFault {
    /// The peer reset or aborted the connection mid-exchange.
    ConnectionReset,
    /// The response could not be parsed (bad status line) or ended early.
    MalformedResponse,
    /// Connection could not be established (DNS, refused, TLS).
    Connect,
    /// Any other network failure.
    Other,
}

impl NetworkFault {
    /// Returns true for the sporadic faults that are worth retrying.
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(self, Self::ConnectionReset | Self::MalformedResponse)
    }
}

impl fmt::Display for NetworkFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ConnectionReset => "connection reset",
            Self::MalformedResponse => "malformed response",
            Self::Connect => "connect failure",
            Self::Other => "network failure",
        };
        f.write_str(label)
    }
}

/// Errors that can occur while fetching a page or document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error.
    #[error("network error fetching {url} ({fault}): {source}")]
    Network {
        /// The URL being fetched.
        url: String,
        /// Classified fault category.
        fault: NetworkFault,
        /// The underlying error.
        #[source]
        source: BoxError,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The URL is malformed or uses an unsupported scheme.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client construction failed: {reason}")]
    ClientBuild {
        /// Why construction failed.
        reason: String,
    },
}

impl FetchError {
    /// Creates a network error, classifying the fault from the source chain.
    pub fn network(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        let source = source.into();
        let fault = classify_source_chain(source.as_ref());
        Self::Network {
            url: url.into(),
            fault,
            source,
        }
    }

    /// Creates a network error with an explicit fault category.
    pub fn network_with_fault(
        url: impl Into<String>,
        fault: NetworkFault,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Network {
            url: url.into(),
            fault,
            source: source.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Maps a reqwest error into a fetch error for `url`.
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::timeout(url);
        }
        if error.is_builder() {
            return Self::invalid_url(url);
        }
        let mut fault = classify_source_chain(&error);
        if fault == NetworkFault::Other && error.is_connect() {
            fault = NetworkFault::Connect;
        }
        Self::network_with_fault(url, fault, error)
    }

    /// Returns the classified network fault, if this is a network error.
    #[must_use]
    pub fn fault(&self) -> Option<NetworkFault> {
        match self {
            Self::Network { fault, .. } => Some(*fault),
            _ => None,
        }
    }

    /// Returns true when retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.fault().is_some_and(NetworkFault::is_transient)
    }
}

/// Walks an error and its sources, returning the first recognised fault category.
#[must_use]
pub fn classify_source_chain(error: &(dyn StdError + 'static)) -> NetworkFault {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
                    return NetworkFault::ConnectionReset;
                }
                io::ErrorKind::UnexpectedEof => return NetworkFault::MalformedResponse,
                io::ErrorKind::ConnectionRefused
                | io::ErrorKind::NotConnected
                | io::ErrorKind::AddrNotAvailable => return NetworkFault::Connect,
                _ => {}
            }
        }
        if let Some(hyper_err) = err.downcast_ref::<hyper::Error>()
            && (hyper_err.is_parse() || hyper_err.is_incomplete_message())
        {
            return NetworkFault::MalformedResponse;
        }
        current = err.source();
    }
    NetworkFault::Other
}
