//! Future Medicine journals.

use async_trait::async_trait;

use super::utils::join_origin;
use super::{Candidate, Finder, FinderError, LandingPage};
use crate::fetch::PageFetcher;

const NAME: &str = "future-medicine";

/// Anchor whose `href` contains `/doi/pdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FutureMedicineFinder;

#[async_trait]
impl Finder for FutureMedicineFinder {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn find(
        &self,
        page: &LandingPage,
        _fetcher: &dyn PageFetcher,
    ) -> Result<Candidate, FinderError> {
        let Some(href) = page
            .document()
            .elements("a")
            .filter_map(|a| a.attr("href"))
            .find(|href| href.contains("/doi/pdf"))
        else {
            return Ok(Candidate::NoMatch);
        };

        let base = page.require_url(NAME)?;
        Ok(Candidate::from_option(join_origin(base, href)))
    }
}
