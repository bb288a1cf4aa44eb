//! Error types for identifier list parsing.

use thiserror::Error;

/// Reasons an input token is rejected as an identifier or display name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The identifier token cannot be used in a redirector URL or as a filename.
    #[error("invalid identifier '{token}': {reason}\n  Suggestion: {suggestion}")]
    InvalidIdentifier {
        /// The rejected token
        token: String,
        /// Why it was rejected
        reason: String,
        /// How to fix the input
        suggestion: String,
    },

    /// The display name cannot be used as an output filename.
    #[error("invalid name '{name}' for identifier '{token}': {reason}")]
    InvalidName {
        /// The identifier the name belongs to
        token: String,
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },
}

impl ParseError {
    /// Creates an `InvalidIdentifier` error.
    #[must_use]
    pub fn invalid_identifier(token: &str, reason: &str) -> Self {
        Self::InvalidIdentifier {
            token: token.to_string(),
            reason: reason.to_string(),
            suggestion: "Use bare PubMed IDs such as 31452104".to_string(),
        }
    }

    /// Creates an `InvalidName` error.
    #[must_use]
    pub fn invalid_name(token: &str, name: &str, reason: &str) -> Self {
        Self::InvalidName {
            token: token.to_string(),
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_identifier_display_has_suggestion() {
        let msg = ParseError::invalid_identifier("a/b", "contains a path separator").to_string();
        assert!(msg.contains("a/b"), "Expected token in: {msg}");
        assert!(msg.contains("path separator"), "Expected reason in: {msg}");
        assert!(msg.contains("Suggestion:"), "Expected suggestion in: {msg}");
    }

    #[test]
    fn test_invalid_name_display() {
        let msg = ParseError::invalid_name("123", "..", "reserved path component").to_string();
        assert!(msg.contains("123"));
        assert!(msg.contains(".."));
    }
}
