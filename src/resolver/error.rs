//! Error types for resolving a single identifier.

use thiserror::Error;

use crate::download::DownloadError;
use crate::fetch::FetchError;

/// Faults that abort one resolution attempt.
///
/// A missing strategy match or an unsupported platform is not an error; those
/// are reported as [`super::Outcome::Unresolved`].
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A redirector, strategy or document request failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The fetched document could not be written.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The redirector template has no `{id}` placeholder.
    #[error("invalid redirector template '{template}': missing {{id}} placeholder")]
    InvalidRedirector {
        /// The rejected template.
        template: String,
    },
}

impl ResolveError {
    /// Creates an `InvalidRedirector` error.
    #[must_use]
    pub fn invalid_redirector(template: &str) -> Self {
        Self::InvalidRedirector {
            template: template.to_string(),
        }
    }

    /// Returns true when another attempt may succeed.
    ///
    /// Only connection resets and malformed or truncated responses qualify.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Fetch(error) => error.is_transient(),
            Self::Download(_) | Self::InvalidRedirector { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::fetch::NetworkFault;

    #[test]
    fn test_connection_reset_is_transient() {
        let error = ResolveError::from(FetchError::network(
            "http://x",
            io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"),
        ));
        assert!(error.is_transient());
    }

    #[test]
    fn test_connect_failure_and_timeout_are_fatal() {
        let refused = ResolveError::from(FetchError::network_with_fault(
            "http://x",
            NetworkFault::Connect,
            io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        ));
        assert!(!refused.is_transient());
        assert!(!ResolveError::from(FetchError::timeout("http://x")).is_transient());
    }

    #[test]
    fn test_download_error_is_fatal() {
        let error = ResolveError::from(DownloadError::io(
            "/out/1.pdf",
            io::Error::new(io::ErrorKind::StorageFull, "disk full"),
        ));
        assert!(!error.is_transient());
    }

    #[test]
    fn test_invalid_redirector_display() {
        let error = ResolveError::invalid_redirector("http://x/?id=1");
        assert_eq!(
            error.to_string(),
            "invalid redirector template 'http://x/?id=1': missing {id} placeholder"
        );
    }
}
