//! Landing bodies that are nothing but a link to a `.pdf`.

use async_trait::async_trait;

use super::utils::absolutize_url;
use super::{Candidate, Finder, FinderError, LandingPage};
use crate::fetch::PageFetcher;

const NAME: &str = "direct-pdf-link";

/// Treats a trimmed body ending in `.pdf` as the document URL itself.
///
/// Tried last: it only fires on bodies that carry no markup at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectPdfLinkFinder;

#[async_trait]
impl Finder for DirectPdfLinkFinder {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn find(
        &self,
        page: &LandingPage,
        _fetcher: &dyn PageFetcher,
    ) -> Result<Candidate, FinderError> {
        let Ok(text) = std::str::from_utf8(page.body()) else {
            return Ok(Candidate::NoMatch);
        };
        let text = text.trim();
        if text.is_empty()
            || !text.to_ascii_lowercase().ends_with(".pdf")
            || text.chars().any(char::is_whitespace)
        {
            return Ok(Candidate::NoMatch);
        }

        let url = match page.url() {
            Some(base) => absolutize_url(text, base),
            None if text.starts_with("http://") || text.starts_with("https://") => {
                Some(text.to_string())
            }
            None => return Err(FinderError::structure(NAME, "relative link without base")),
        };
        Ok(Candidate::from_option(url))
    }
}
