//! Generic strategy: the Highwire `citation_pdf_url` meta tag.

use async_trait::async_trait;

use super::utils::absolutize_url;
use super::{Candidate, Finder, FinderError, LandingPage};
use crate::fetch::PageFetcher;

const NAME: &str = "generic-citation";

/// Reads `<meta name="citation_pdf_url" content="...">`.
///
/// Most publisher platforms emit this tag for indexing, which makes it the most
/// reliable marker and the first one tried.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericCitationFinder;

#[async_trait]
impl Finder for GenericCitationFinder {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn find(
        &self,
        page: &LandingPage,
        _fetcher: &dyn PageFetcher,
    ) -> Result<Candidate, FinderError> {
        let Some(content) = page.document().meta_content("citation_pdf_url") else {
            return Ok(Candidate::NoMatch);
        };
        let url = match page.url() {
            Some(base) => absolutize_url(content, base),
            None if content.starts_with("http://") || content.starts_with("https://") => {
                Some(content.to_string())
            }
            None => return Err(FinderError::structure(NAME, "relative citation URL without base")),
        };
        Ok(Candidate::from_option(url))
    }
}
