//! ScienceDirect, reached through the Elsevier linking hub.
//!
//! The linking hub page carries the article URL in a hidden form input. The
//! article page then exposes `citation_pdf_url`, which itself serves a small
//! interstitial whose first anchor is the document.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::document::HtmlDocument;
use super::utils::absolutize_url;
use super::{Candidate, Finder, FinderError, LandingPage};
use crate::fetch::PageFetcher;

const NAME: &str = "science-direct";

/// Follows the linking-hub redirect input, then the citation meta tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScienceDirectFinder;

impl ScienceDirectFinder {
    fn redirect_target(page: &LandingPage) -> Option<Result<String, FinderError>> {
        let document = page.document();
        let input = document
            .elements("input")
            .find(|input| {
                input
                    .attr("name")
                    .is_some_and(|name| name.eq_ignore_ascii_case("redirectURL"))
            })
            .or_else(|| document.elements("input").next())?;

        let Some(value) = input.attr("value").filter(|v| !v.trim().is_empty()) else {
            return Some(Err(FinderError::structure(NAME, "redirect input has no value")));
        };
        Some(
            urlencoding::decode(value.trim())
                .map_err(|e| FinderError::structure(NAME, format!("undecodable redirect: {e}")))
                .and_then(|decoded| web_url(decoded.into_owned(), "redirect value")),
        )
    }
}

/// Accepts only absolute http(s) URLs; anything else is not this site's form.
fn web_url(candidate: String, what: &str) -> Result<String, FinderError> {
    match Url::parse(&candidate) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(candidate),
        _ => Err(FinderError::structure(
            NAME,
            format!("{what} is not an http(s) URL: {candidate}"),
        )),
    }
}

#[async_trait]
impl Finder for ScienceDirectFinder {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn find(
        &self,
        page: &LandingPage,
        fetcher: &dyn PageFetcher,
    ) -> Result<Candidate, FinderError> {
        let Some(target) = Self::redirect_target(page) else {
            return Ok(Candidate::NoMatch);
        };
        let target = target?;

        debug!(url = %target, "following linking-hub redirect");
        let article = fetcher.fetch(&target).await?;
        let article_url = article
            .parsed_url()
            .ok_or_else(|| FinderError::structure(NAME, "article URL is not absolute"))?;
        let article_doc = HtmlDocument::parse(&article.body);
        let Some(citation) = article_doc.meta_content("citation_pdf_url") else {
            return Err(FinderError::structure(NAME, "article page has no citation_pdf_url"));
        };
        let citation = absolutize_url(citation, &article_url)
            .ok_or_else(|| FinderError::structure(NAME, "empty citation_pdf_url"))?;
        let citation = web_url(citation, "citation_pdf_url")?;

        debug!(url = %citation, "fetching document interstitial");
        let interstitial = fetcher.fetch(&citation).await?;
        let interstitial_url = interstitial
            .parsed_url()
            .ok_or_else(|| FinderError::structure(NAME, "interstitial URL is not absolute"))?;
        let interstitial_doc = HtmlDocument::parse(&interstitial.body);
        let href = interstitial_doc
            .elements("a")
            .next()
            .and_then(|a| a.attr("href"))
            .ok_or_else(|| FinderError::structure(NAME, "interstitial has no link"))?;

        Ok(Candidate::from_option(absolutize_url(href, &interstitial_url)))
    }
}
