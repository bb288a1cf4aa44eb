//! ACS Publications.

use async_trait::async_trait;

use super::utils::join_origin;
use super::{Candidate, Finder, FinderError, LandingPage};
use crate::fetch::PageFetcher;

const NAME: &str = "acs-publications";
const TITLE_MARKERS: [&str; 2] = ["high-res pdf", "low-res pdf"];

/// Anchor whose `title` mentions a high- or low-resolution PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcsPublicationsFinder;

#[async_trait]
impl Finder for AcsPublicationsFinder {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn find(
        &self,
        page: &LandingPage,
        _fetcher: &dyn PageFetcher,
    ) -> Result<Candidate, FinderError> {
        let Some(href) = page.document().elements("a").find_map(|a| {
            let title = a.attr("title")?.to_lowercase();
            if TITLE_MARKERS.iter().any(|marker| title.contains(marker)) {
                a.attr("href")
            } else {
                None
            }
        }) else {
            return Ok(Candidate::NoMatch);
        };

        let base = page.require_url(NAME)?;
        Ok(Candidate::from_option(join_origin(base, href)))
    }
}
