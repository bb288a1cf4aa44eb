//! Parse-once index of the start tags in an HTML page.
//!
//! Finders only look at element names and attribute values (`<a href title>`,
//! `<meta name content>`, `<input value>`), so the page is scanned a single
//! time into a flat list of start tags with their attributes.

use std::sync::LazyLock;

use regex::Regex;

use super::utils::{compile_static_regex, html_unescape_basic};

static START_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"(?s)<([a-zA-Z][a-zA-Z0-9-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+))?)*)\s*/?>"#,
    )
});
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
});
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?s)<!--.*?-->"));

/// One start tag with its attributes, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
}

impl Element {
    /// Lowercase tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Value of the first attribute named `name` (case-insensitive), entity-decoded.
    ///
    /// Attributes written without a value yield an empty string.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Start tags of a parsed HTML page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlDocument {
    elements: Vec<Element>,
}

impl HtmlDocument {
    /// Parses a raw response body. Invalid UTF-8 is replaced, never rejected.
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        let text = COMMENT_RE.replace_all(&text, "");

        let elements = START_TAG_RE
            .captures_iter(&text)
            .filter_map(|caps| {
                let tag = caps.get(1)?.as_str().to_ascii_lowercase();
                let attrs = caps
                    .get(2)
                    .map(|raw| parse_attributes(raw.as_str()))
                    .unwrap_or_default();
                Some(Element { tag, attrs })
            })
            .collect();

        Self { elements }
    }

    /// All elements named `tag`, in document order.
    pub fn elements<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements
            .iter()
            .filter(move |element| element.tag.eq_ignore_ascii_case(tag))
    }

    /// Content of the first `<meta>` whose `name` (or `property`) equals `name`.
    #[must_use]
    pub fn meta_content(&self, name: &str) -> Option<&str> {
        self.elements("meta").find_map(|meta| {
            let key = meta.attr("name").or_else(|| meta.attr("property"))?;
            if key.trim().eq_ignore_ascii_case(name) {
                meta.attr("content")
            } else {
                None
            }
        })
    }
}

fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(raw)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or(String::new(), |m| html_unescape_basic(m.as_str()));
            Some((key, value))
        })
        .collect()
}
