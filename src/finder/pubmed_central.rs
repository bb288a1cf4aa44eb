//! PubMed Central article pages.

use async_trait::async_trait;

use super::{Candidate, Finder, FinderError, LandingPage};
use crate::fetch::PageFetcher;

/// Host that PMC article paths are joined onto.
pub const PMC_BASE_URL: &str = "https://www.ncbi.nlm.nih.gov";

const PMC_PATH_MARKER: &str = "/pmc/articles";

/// Finds the first anchor whose `href` points into `/pmc/articles`.
///
/// The href is appended to the PMC host when relative.
#[derive(Debug, Clone)]
pub struct PubMedCentralFinder {
    base_url: String,
}

impl PubMedCentralFinder {
    /// Creates the finder joined against the public PMC host.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(PMC_BASE_URL)
    }

    /// Creates the finder joined against another host.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for PubMedCentralFinder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Finder for PubMedCentralFinder {
    fn name(&self) -> &'static str {
        "pubmed-central"
    }

    async fn find(
        &self,
        page: &LandingPage,
        _fetcher: &dyn PageFetcher,
    ) -> Result<Candidate, FinderError> {
        let href = page
            .document()
            .elements("a")
            .filter_map(|a| a.attr("href"))
            .find(|href| href.contains(PMC_PATH_MARKER));

        Ok(Candidate::from_option(href.map(|href| {
            if href.starts_with("http://") || href.starts_with("https://") {
                href.to_string()
            } else {
                format!("{}/{}", self.base_url, href.trim_start_matches('/'))
            }
        })))
    }
}
