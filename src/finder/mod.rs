//! Site-specific strategies that locate a document URL on a landing page.
//!
//! # Architecture
//!
//! - [`Finder`] - Async trait that each strategy implements
//! - [`FinderSet`] - Fixed, ordered registry; first match wins
//! - [`Candidate`] - Explicit `Match(url)` / `NoMatch` result of one strategy
//! - [`LandingPage`] - The redirector response plus its parse-once [`HtmlDocument`]
//!
//! Default order (most general and reliable first, the extra-round-trip and
//! body-only strategies last):
//!
//! 1. [`GenericCitationFinder`]
//! 2. [`PubMedCentralFinder`], [`AcsPublicationsFinder`], [`UchicagoPressFinder`],
//!    [`NejmFinder`], [`FutureMedicineFinder`]
//! 3. [`ScienceDirectFinder`]
//! 4. [`DirectPdfLinkFinder`]

mod acs;
mod direct_pdf;
mod document;
mod future_medicine;
mod generic_citation;
mod nejm;
mod pubmed_central;
mod science_direct;
mod uchicago;
mod utils;

pub use acs::AcsPublicationsFinder;
pub use direct_pdf::DirectPdfLinkFinder;
pub use document::{Element, HtmlDocument};
pub use future_medicine::FutureMedicineFinder;
pub use generic_citation::GenericCitationFinder;
pub use nejm::NejmFinder;
pub use pubmed_central::PubMedCentralFinder;
pub use science_direct::ScienceDirectFinder;
pub use uchicago::UchicagoPressFinder;
pub use utils::{absolutize_url, join_origin, origin_of};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::fetch::{FetchError, FetchResult, PageFetcher};

/// Result of a single strategy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// The strategy located a document URL.
    Match(String),
    /// The strategy's marker is absent from the page.
    NoMatch,
}

impl Candidate {
    /// Builds a candidate from an optional URL; blank URLs are `NoMatch`.
    #[must_use]
    pub fn from_option(url: Option<String>) -> Self {
        match url {
            Some(url) if !url.trim().is_empty() => Self::Match(url.trim().to_string()),
            _ => Self::NoMatch,
        }
    }
}

/// Errors a strategy can raise besides "no match".
#[derive(Debug, Error)]
pub enum FinderError {
    /// The page did not have the shape the strategy expected.
    ///
    /// Treated by the resolver exactly like `NoMatch`.
    #[error("finder '{finder}' could not use the page: {reason}")]
    Structure {
        /// The strategy name
        finder: &'static str,
        /// What was missing or malformed
        reason: String,
    },

    /// A follow-up request made by the strategy failed at the network level.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl FinderError {
    /// Creates a `Structure` error.
    #[must_use]
    pub fn structure(finder: &'static str, reason: impl Into<String>) -> Self {
        Self::Structure {
            finder,
            reason: reason.into(),
        }
    }
}

/// A fetched landing page: raw response plus parsed HTML.
#[derive(Debug, Clone)]
pub struct LandingPage {
    response: FetchResult,
    url: Option<Url>,
    document: HtmlDocument,
}

impl LandingPage {
    /// Wraps a response, parsing its body as HTML once.
    #[must_use]
    pub fn new(response: FetchResult) -> Self {
        let url = response.parsed_url();
        let document = HtmlDocument::parse(&response.body);
        Self {
            response,
            url,
            document,
        }
    }

    /// The raw response.
    #[must_use]
    pub fn response(&self) -> &FetchResult {
        &self.response
    }

    /// The final landing URL, if it parsed.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// The parsed document.
    #[must_use]
    pub fn document(&self) -> &HtmlDocument {
        &self.document
    }

    /// The raw body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.response.body
    }

    fn require_url(&self, finder: &'static str) -> Result<&Url, FinderError> {
        self.url
            .as_ref()
            .ok_or_else(|| FinderError::structure(finder, "landing URL is not absolute"))
    }
}

/// A strategy that extracts a document URL from a landing page.
///
/// # Object Safety
///
/// Uses `async_trait` so strategies can be stored as `Box<dyn Finder>`.
#[async_trait]
pub trait Finder: Send + Sync {
    /// Stable strategy name used in logs and outcomes.
    fn name(&self) -> &'static str;

    /// Evaluates the strategy against `page`.
    ///
    /// `fetcher` is only used by strategies that need a further round-trip.
    async fn find(
        &self,
        page: &LandingPage,
        fetcher: &dyn PageFetcher,
    ) -> Result<Candidate, FinderError>;
}

/// The winning strategy and its candidate URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderMatch {
    /// Name of the strategy that matched.
    pub finder: &'static str,
    /// Position of the strategy in the set.
    pub index: usize,
    /// The candidate document URL.
    pub url: String,
}

/// Ordered collection of strategies.
pub struct FinderSet {
    finders: Vec<Box<dyn Finder>>,
}

impl FinderSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            finders: Vec::new(),
        }
    }

    /// Appends a strategy; it is tried after all previously registered ones.
    pub fn register(&mut self, finder: Box<dyn Finder>) {
        debug!(name = finder.name(), position = self.finders.len(), "registering finder");
        self.finders.push(finder);
    }

    /// Returns the number of strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.finders.len()
    }

    /// Returns true if no strategies are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.finders.is_empty()
    }

    /// Strategy names in evaluation order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.finders.iter().map(|f| f.name()).collect()
    }

    /// The strategy at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&dyn Finder> {
        self.finders.get(index).map(AsRef::as_ref)
    }

    /// Evaluates strategies in order and returns the first match.
    ///
    /// Structural failures are logged and treated as no match.
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] of a strategy whose follow-up request failed;
    /// later strategies are not evaluated.
    pub async fn first_match(
        &self,
        page: &LandingPage,
        fetcher: &dyn PageFetcher,
    ) -> Result<Option<FinderMatch>, FetchError> {
        for (index, finder) in self.finders.iter().enumerate() {
            debug!(finder = finder.name(), "trying finder");
            match finder.find(page, fetcher).await {
                Ok(Candidate::Match(url)) => {
                    debug!(finder = finder.name(), url = %url, "finder matched");
                    return Ok(Some(FinderMatch {
                        finder: finder.name(),
                        index,
                        url,
                    }));
                }
                Ok(Candidate::NoMatch) => {}
                Err(FinderError::Structure { finder, reason }) => {
                    debug!(finder, %reason, "finder could not use page; treating as no match");
                }
                Err(FinderError::Fetch(error)) => return Err(error),
            }
        }
        Ok(None)
    }
}

impl Default for FinderSet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FinderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderSet")
            .field("finders", &self.names())
            .finish()
    }
}

/// Builds the default strategy registry in its fixed priority order.
#[must_use]
pub fn build_default_finder_set() -> FinderSet {
    let mut set = FinderSet::new();
    set.register(Box::new(GenericCitationFinder));
    set.register(Box::new(PubMedCentralFinder::new()));
    set.register(Box::new(AcsPublicationsFinder));
    set.register(Box::new(UchicagoPressFinder));
    set.register(Box::new(NejmFinder));
    set.register(Box::new(FutureMedicineFinder));
    set.register(Box::new(ScienceDirectFinder));
    set.register(Box::new(DirectPdfLinkFinder));
    set
}
