//! Shared helpers for finders: URL joining, entity decoding and static regexes.

use regex::Regex;
use url::Url;

/// Compiles a regex at static init; panics on invalid pattern.
pub fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Returns `scheme://host[:port]` of `url`.
#[must_use]
pub fn origin_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    })
}

/// Combines the origin of `page_url` with a path taken from the page.
///
/// Absolute `http(s)` values are returned unchanged and `//host/...` values
/// inherit the page scheme. Relative values are appended to the origin, not
/// resolved against the page's directory.
#[must_use]
pub fn join_origin(page_url: &Url, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(value.to_string());
    }
    if let Some(rest) = value.strip_prefix("//") {
        return Some(format!("{}://{rest}", page_url.scheme()));
    }
    let origin = origin_of(page_url)?;
    Some(format!("{origin}/{}", value.trim_start_matches('/')))
}

/// Resolves a possibly relative URL string against a base URL.
///
/// Returns the value as-is if it already starts with `http://` or `https://`;
/// normalizes `//...` to the base scheme; otherwise joins with `base_url`.
#[must_use]
pub fn absolutize_url(value: &str, base_url: &Url) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(value.to_string());
    }
    if let Some(rest) = value.strip_prefix("//") {
        return Some(format!("{}://{rest}", base_url.scheme()));
    }
    base_url.join(value).ok().map(|url| url.to_string())
}

/// Decodes the handful of HTML entities that show up in attribute values.
#[must_use]
pub fn html_unescape_basic(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&#x2F;", "/")
        .replace("&#47;", "/")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{00a0}")
        .replace("&#160;", "\u{00a0}")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn url(value: &str) -> Url {
        Url::parse(value).unwrap()
    }

    #[test]
    fn test_origin_of_keeps_scheme_host_and_port() {
        assert_eq!(
            origin_of(&url("https://pubs.acs.org/doi/abs/10.1021/x")).unwrap(),
            "https://pubs.acs.org"
        );
        assert_eq!(
            origin_of(&url("http://127.0.0.1:8080/a/b")).unwrap(),
            "http://127.0.0.1:8080"
        );
    }

    #[test]
    fn test_join_origin_relative_path_uses_origin_not_directory() {
        let page = url("https://www.nejm.org/doi/full/10.1056/NEJMoa1");
        assert_eq!(
            join_origin(&page, "/doi/pdf/10.1056/NEJMoa1").unwrap(),
            "https://www.nejm.org/doi/pdf/10.1056/NEJMoa1"
        );
        assert_eq!(
            join_origin(&page, "doi/pdf/x").unwrap(),
            "https://www.nejm.org/doi/pdf/x"
        );
    }

    #[test]
    fn test_join_origin_absolute_and_protocol_relative() {
        let page = url("https://example.com/a/");
        assert_eq!(
            join_origin(&page, "http://other.org/x.pdf").unwrap(),
            "http://other.org/x.pdf"
        );
        assert_eq!(
            join_origin(&page, "//cdn.example.com/x.pdf").unwrap(),
            "https://cdn.example.com/x.pdf"
        );
        assert!(join_origin(&page, "   ").is_none());
    }

    #[test]
    fn test_absolutize_url_relative_resolves_against_directory() {
        let base = url("https://example.com/foo/");
        assert_eq!(
            absolutize_url("bar.pdf", &base).unwrap(),
            "https://example.com/foo/bar.pdf"
        );
        assert_eq!(
            absolutize_url("/root.pdf", &base).unwrap(),
            "https://example.com/root.pdf"
        );
    }

    #[test]
    fn test_html_unescape_basic() {
        assert_eq!(html_unescape_basic(" a&amp;b &quot;c&quot; "), "a&b \"c\"");
        assert_eq!(html_unescape_basic("&amp;lt;"), "&lt;");
    }
}
