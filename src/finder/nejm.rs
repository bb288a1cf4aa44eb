//! New England Journal of Medicine.

use async_trait::async_trait;

use super::utils::join_origin;
use super::{Candidate, Finder, FinderError, LandingPage};
use crate::fetch::PageFetcher;

const NAME: &str = "nejm";

/// Anchor tagged `data-download-type="article pdf"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NejmFinder;

#[async_trait]
impl Finder for NejmFinder {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn find(
        &self,
        page: &LandingPage,
        _fetcher: &dyn PageFetcher,
    ) -> Result<Candidate, FinderError> {
        let Some(href) = page.document().elements("a").find_map(|a| {
            a.attr("data-download-type")
                .filter(|kind| kind.trim().eq_ignore_ascii_case("article pdf"))
                .and_then(|_| a.attr("href"))
        }) else {
            return Ok(Candidate::NoMatch);
        };

        let base = page.require_url(NAME)?;
        Ok(Candidate::from_option(join_origin(base, href)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::test_support::{MapFetcher, page};
    use super::*;

    #[tokio::test]
    async fn test_download_type_anchor_matches() {
        let landing = page(
            "https://www.nejm.org/doi/full/10.1056/NEJMoa1",
            r#"<a data-download-type="supplement" href="/doi/suppl/1">Supp</a>
               <a data-download-type="Article PDF" href="/doi/pdf/10.1056/NEJMoa1">PDF</a>"#,
        );
        let candidate = NejmFinder
            .find(&landing, &MapFetcher::default())
            .await
            .unwrap();
        assert_eq!(
            candidate,
            Candidate::Match("https://www.nejm.org/doi/pdf/10.1056/NEJMoa1".to_string())
        );
    }

    #[tokio::test]
    async fn test_anchor_without_href_is_no_match() {
        let landing = page(
            "https://www.nejm.org/doi/full/1",
            r#"<a data-download-type="article pdf">PDF</a>"#,
        );
        let candidate = NejmFinder
            .find(&landing, &MapFetcher::default())
            .await
            .unwrap();
        assert_eq!(candidate, Candidate::NoMatch);
    }
}
