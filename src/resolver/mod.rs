//! Resolution of one identifier into a document on disk.
//!
//! # Pipeline
//!
//! 1. `{out}/{stem}.pdf` or `{out}/{stem}.html` already exists → [`Outcome::Skipped`], no network access
//! 2. GET the redirector URL for the identifier (redirects followed)
//! 3. Landing URL contains an unsupported-platform marker → [`Outcome::Unresolved`]
//! 4. Run the [`FinderSet`] against the landing page; first match wins
//! 5. GET the candidate and hand the body to the [`DocumentStore`]
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reprint_core::download::DocumentStore;
//! use reprint_core::fetch::HttpFetcher;
//! use reprint_core::resolver::Resolver;
//! use reprint_core::user_agent::BROWSER_USER_AGENT;
//! use reprint_core::Identifier;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Arc::new(HttpFetcher::new(BROWSER_USER_AGENT)?);
//! let resolver = Resolver::new(fetcher, DocumentStore::new("./papers"));
//! let outcome = resolver.resolve(&Identifier::new("31452104")).await?;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

mod error;
mod host_guard;
mod outcome;

pub use error::ResolveError;
pub use host_guard::{HostGuard, HostPermit, extract_host};
pub use outcome::{Outcome, UnresolvedReason};

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::Identifier;
use crate::download::DocumentStore;
use crate::fetch::PageFetcher;
use crate::finder::{FinderSet, LandingPage, build_default_finder_set};

/// NCBI E-utilities link-out endpoint that redirects to the publisher page.
pub const DEFAULT_REDIRECTOR: &str =
    "http://eutils.ncbi.nlm.nih.gov/entrez/eutils/elink.fcgi?dbfrom=pubmed&id={id}&retmode=ref&cmd=prlinks";

/// Placeholder replaced by the URL-encoded identifier.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Landing URL substrings that mark platforms no strategy can handle.
pub const DEFAULT_UNSUPPORTED_MARKERS: [&str; 1] = ["ovid"];

/// Resolves identifiers to documents.
///
/// Owns everything a resolution needs: the fetcher (and with it the request
/// headers), the strategy set, the output store and the redirector template.
pub struct Resolver {
    fetcher: Arc<dyn PageFetcher>,
    finders: FinderSet,
    store: DocumentStore,
    redirector: String,
    unsupported_markers: Vec<String>,
    host_guard: Arc<HostGuard>,
}

impl Resolver {
    /// Creates a resolver with the default strategies, redirector and markers.
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>, store: DocumentStore) -> Self {
        Self {
            fetcher,
            finders: build_default_finder_set(),
            store,
            redirector: DEFAULT_REDIRECTOR.to_string(),
            unsupported_markers: DEFAULT_UNSUPPORTED_MARKERS
                .iter()
                .map(ToString::to_string)
                .collect(),
            host_guard: Arc::new(HostGuard::disabled()),
        }
    }

    /// Replaces the strategy set.
    #[must_use]
    pub fn with_finders(mut self, finders: FinderSet) -> Self {
        self.finders = finders;
        self
    }

    /// Replaces the redirector template.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidRedirector`] if the template lacks `{id}`.
    pub fn with_redirector(mut self, template: impl Into<String>) -> Result<Self, ResolveError> {
        let template = template.into();
        if !template.contains(ID_PLACEHOLDER) {
            return Err(ResolveError::invalid_redirector(&template));
        }
        self.redirector = template;
        Ok(self)
    }

    /// Replaces the unsupported-platform markers. Empty markers are dropped.
    #[must_use]
    pub fn with_unsupported_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unsupported_markers = markers
            .into_iter()
            .map(Into::into)
            .filter(|marker: &String| !marker.is_empty())
            .collect();
        self
    }

    /// Shares a host guard between resolver invocations on different workers.
    #[must_use]
    pub fn with_host_guard(mut self, host_guard: Arc<HostGuard>) -> Self {
        self.host_guard = host_guard;
        self
    }

    /// The output store.
    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// The strategy set.
    #[must_use]
    pub fn finders(&self) -> &FinderSet {
        &self.finders
    }

    /// Redirector URL for `identifier`.
    #[must_use]
    pub fn redirector_url(&self, identifier: &Identifier) -> String {
        self.redirector
            .replace(ID_PLACEHOLDER, &urlencoding::encode(identifier.id()))
    }

    /// Resolves one identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Fetch`] when the redirector, a strategy
    /// follow-up or the document request fails, and [`ResolveError::Download`]
    /// when the document cannot be written. Use [`ResolveError::is_transient`]
    /// to decide whether to try again.
    #[instrument(skip(self, identifier), fields(id = %identifier.id(), stem = %identifier.file_stem()))]
    pub async fn resolve(&self, identifier: &Identifier) -> Result<Outcome, ResolveError> {
        let stem = identifier.file_stem();

        if let Some(path) = self.store.existing_document(stem) {
            info!(path = %path.display(), "already downloaded, skipping");
            return Ok(Outcome::Skipped { path });
        }

        let redirector_url = self.redirector_url(identifier);
        debug!(url = %redirector_url, "fetching redirector");
        let landing = self.fetcher.fetch(&redirector_url).await?;
        debug!(url = %landing.url, status = landing.status, "landed");

        if let Some(marker) = self
            .unsupported_markers
            .iter()
            .find(|marker| landing.url.contains(marker.as_str()))
        {
            info!(url = %landing.url, marker = %marker, "unsupported platform");
            return Ok(Outcome::Unresolved(UnresolvedReason::UnsupportedPlatform {
                marker: marker.clone(),
            }));
        }

        let _permit = self.host_guard.acquire(&landing.url).await;
        let page = LandingPage::new(landing);

        let Some(found) = self
            .finders
            .first_match(&page, self.fetcher.as_ref())
            .await?
        else {
            info!(url = %page.response().url, "no strategy matched");
            return Ok(Outcome::Unresolved(UnresolvedReason::NoStrategyMatched));
        };

        debug!(finder = found.finder, url = %found.url, "fetching document");
        let document = self.fetcher.fetch(&found.url).await?;
        if !document.is_success() {
            debug!(status = document.status, url = %found.url, "document request returned non-success status");
        }
        let saved = self.store.save(stem, &document.body).await?;

        info!(finder = found.finder, path = %saved.path.display(), "resolved");
        Ok(Outcome::Resolved {
            url: found.url,
            path: saved.path,
            finder: found.finder,
        })
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("finders", &self.finders)
            .field("store", &self.store)
            .field("redirector", &self.redirector)
            .field("unsupported_markers", &self.unsupported_markers)
            .field("host_guard", &self.host_guard)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::fetch::{FetchError, FetchResult};

    const REDIRECT: &str = "http://redirector.test/link?id={id}";

    /// Maps request URLs to (final URL, body); records every request.
    #[derive(Default)]
    struct ScriptedFetcher {
        routes: HashMap<String, (String, Vec<u8>)>,
        requests: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn route(mut self, from: &str, landed: &str, body: &[u8]) -> Self {
            self.routes
                .insert(from.to_string(), (landed.to_string(), body.to_vec()));
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            match self.routes.get(url) {
                Some((landed, body)) => Ok(FetchResult::new(landed.clone(), 200, body.clone())),
                None => Err(FetchError::network(
                    url,
                    std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
                )),
            }
        }
    }

    fn resolver(fetcher: Arc<ScriptedFetcher>, dir: &TempDir) -> Resolver {
        Resolver::new(fetcher, DocumentStore::new(dir.path()))
            .with_redirector(REDIRECT)
            .unwrap()
    }

    #[tokio::test]
    async fn test_existing_document_skips_without_network() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("42.pdf"), b"%PDF").unwrap();
        let fetcher = Arc::new(ScriptedFetcher::default());

        let outcome = resolver(Arc::clone(&fetcher), &dir)
            .resolve(&Identifier::new("42"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Skipped {
                path: dir.path().join("42.pdf")
            }
        );
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_skip_check_uses_display_name_stem() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("smith2020.pdf"), b"%PDF").unwrap();
        let fetcher = Arc::new(ScriptedFetcher::default());

        let outcome = resolver(Arc::clone(&fetcher), &dir)
            .resolve(&Identifier::with_name("42", "smith2020"))
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Skipped { .. }));
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_marker_stops_before_strategies() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(ScriptedFetcher::default().route(
            "http://redirector.test/link?id=300",
            "https://ovidsp.ovid.com/article/300",
            br#"<meta name="citation_pdf_url" content="https://ovidsp.ovid.com/300.pdf">"#,
        ));

        let outcome = resolver(Arc::clone(&fetcher), &dir)
            .resolve(&Identifier::new("300"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Unresolved(UnresolvedReason::UnsupportedPlatform {
                marker: "ovid".to_string()
            })
        );
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_resolves_and_writes_document() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .route(
                    "http://redirector.test/link?id=200",
                    "https://journal.test/article/200",
                    br#"<meta name="citation_pdf_url" content="/article/200.pdf">"#,
                )
                .route(
                    "https://journal.test/article/200.pdf",
                    "https://journal.test/article/200.pdf",
                    b"%PDF-1.5 body",
                ),
        );

        let outcome = resolver(Arc::clone(&fetcher), &dir)
            .resolve(&Identifier::new("200"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Resolved {
                url: "https://journal.test/article/200.pdf".to_string(),
                path: dir.path().join("200.pdf"),
                finder: "generic-citation",
            }
        );
        assert_eq!(
            std::fs::read(dir.path().join("200.pdf")).unwrap(),
            b"%PDF-1.5 body"
        );
    }

    #[tokio::test]
    async fn test_no_match_is_unresolved() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(ScriptedFetcher::default().route(
            "http://redirector.test/link?id=100",
            "https://journal.test/article/100",
            b"<html></html>",
        ));

        let outcome = resolver(fetcher, &dir)
            .resolve(&Identifier::new("100"))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Unresolved(UnresolvedReason::NoStrategyMatched));
    }

    #[tokio::test]
    async fn test_redirector_failure_is_error() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(ScriptedFetcher::default());
        let error = resolver(fetcher, &dir)
            .resolve(&Identifier::new("1"))
            .await
            .unwrap_err();
        assert!(error.is_transient());
    }

    #[test]
    fn test_redirector_url_encodes_identifier() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(Arc::new(ScriptedFetcher::default()), &dir);
        assert_eq!(
            resolver.redirector_url(&Identifier::new("a b&c")),
            "http://redirector.test/link?id=a%20b%26c"
        );
    }

    #[test]
    fn test_default_redirector_is_eutils() {
        let dir = TempDir::new().unwrap();
        let resolver = Resolver::new(
            Arc::new(ScriptedFetcher::default()),
            DocumentStore::new(dir.path()),
        );
        assert_eq!(
            resolver.redirector_url(&Identifier::new("31452104")),
            "http://eutils.ncbi.nlm.nih.gov/entrez/eutils/elink.fcgi?dbfrom=pubmed&id=31452104&retmode=ref&cmd=prlinks"
        );
    }

    #[test]
    fn test_redirector_without_placeholder_is_rejected() {
        let dir = TempDir::new().unwrap();
        let error = Resolver::new(
            Arc::new(ScriptedFetcher::default()),
            DocumentStore::new(dir.path()),
        )
        .with_redirector("http://x/?id=1")
        .unwrap_err();
        assert!(matches!(error, ResolveError::InvalidRedirector { .. }));
    }

    #[test]
    fn test_empty_markers_are_dropped() {
        let dir = TempDir::new().unwrap();
        let resolver = Resolver::new(
            Arc::new(ScriptedFetcher::default()),
            DocumentStore::new(dir.path()),
        )
        .with_unsupported_markers(["", "ovid", "atypon-blocked"]);
        assert_eq!(resolver.unsupported_markers, ["ovid", "atypon-blocked"]);
    }
}
