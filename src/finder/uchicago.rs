//! University of Chicago Press journals.

use async_trait::async_trait;

use super::utils::join_origin;
use super::{Candidate, Finder, FinderError, LandingPage};
use crate::fetch::PageFetcher;

const NAME: &str = "uchicago-press";

/// Anchor whose `href` contains both `pdf` and `.edu/doi/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UchicagoPressFinder;

#[async_trait]
impl Finder for UchicagoPressFinder {
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
            .find(|href| href.contains("pdf") && href.contains(".edu/doi/"))
        else {
            return Ok(Candidate::NoMatch);
        };

        let base = page.require_url(NAME)?;
        Ok(Candidate::from_option(join_origin(base, href)))
    }
}
