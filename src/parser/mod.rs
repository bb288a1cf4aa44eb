//! Identifier list parsing.
//!
//! Two input shapes are supported:
//! - a comma-separated list of identifiers (names default to the identifiers)
//! - a file body with one identifier per line, optionally followed by
//!   whitespace and a display name
//!
//! # Example
//!
//! ```
//! use reprint_core::parser::{parse_identifier_list, parse_identifier_lines};
//!
//! let result = parse_identifier_list("100, 200");
//! assert_eq!(result.len(), 2);
//!
//! let result = parse_identifier_lines("31452104 smith_2019\n29102234\n");
//! assert_eq!(result.items[0].name(), "smith_2019");
//! assert_eq!(result.items[1].name(), "29102234");
//! ```

mod error;

pub use error::ParseError;

use std::fmt;

use tracing::debug;

use crate::identifier::Identifier;

/// Identifiers parsed from input, plus tokens that were rejected.
#[derive(Debug, Default)]
pub struct ParseResult {
    /// Accepted identifiers in input order
    pub items: Vec<Identifier>,
    /// Rejected tokens (for logging)
    pub skipped: Vec<ParseError>,
}

impl ParseResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no identifiers were accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of accepted identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns the number of rejected tokens.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    fn push(&mut self, token: &str, name: Option<&str>) {
        match build_identifier(token, name) {
            Ok(identifier) => self.items.push(identifier),
            Err(error) => {
                debug!(error = %error, "rejected identifier input");
                self.skipped.push(error);
            }
        }
    }
}

impl fmt::Display for ParseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} identifier(s), {} skipped",
            self.items.len(),
            self.skipped.len()
        )
    }
}

/// Parses a comma-separated identifier list. Empty entries are ignored.
#[must_use]
pub fn parse_identifier_list(input: &str) -> ParseResult {
    let mut result = ParseResult::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        result.push(token, None);
    }
    result
}

/// Parses a line-oriented identifier file.
///
/// Each line holds an identifier and an optional display name separated by
/// whitespace; extra columns are ignored. Blank lines and `#` comments are
/// skipped. Named and unnamed lines may be mixed.
#[must_use]
pub fn parse_identifier_lines(input: &str) -> ParseResult {
    let mut result = ParseResult::new();
    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut columns = line.split_whitespace();
        let Some(token) = columns.next() else {
            continue;
        };
        result.push(token, columns.next());
    }
    result
}

fn build_identifier(token: &str, name: Option<&str>) -> Result<Identifier, ParseError> {
    if let Some(reason) = unsafe_stem_reason(token) {
        return Err(ParseError::invalid_identifier(token, reason));
    }
    match name {
        None => Ok(Identifier::new(token)),
        Some(name) => {
            if let Some(reason) = unsafe_stem_reason(name) {
                return Err(ParseError::invalid_name(token, name, reason));
            }
            Ok(Identifier::with_name(token, name))
        }
    }
}

/// Returns why `value` cannot be used as a file stem inside the output directory.
fn unsafe_stem_reason(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return Some("empty value");
    }
    if value.contains(['/', '\\']) {
        return Some("contains a path separator");
    }
    if value == "." || value == ".." {
        return Some("reserved path component");
    }
    if value.chars().any(char::is_control) {
        return Some("contains control characters");
    }
    None
}
