//! PubMed identifiers with optional display names.

use std::fmt;

/// A PubMed identifier plus the optional display name used for the output file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    id: String,
    name: Option<String>,
}

impl Identifier {
    /// Creates an identifier whose output file is named after the identifier itself.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Creates an identifier with an explicit display name.
    ///
    /// A name equal to the identifier is stored as no name.
    #[must_use]
    pub fn with_name(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        let name = name.into();
        let name = (name != id).then_some(name);
        Self { id, name }
    }

    /// The raw identifier token.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The display name, defaulting to the identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Returns true when an explicit display name was supplied.
    #[must_use]
    pub fn has_custom_name(&self) -> bool {
        self.name.is_some()
    }

    /// Stem of the output file; also the key for the already-downloaded check.
    #[must_use]
    pub fn file_stem(&self) -> &str {
        self.name()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({name})", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_name_defaults_to_id() {
        let identifier = Identifier::new("12345");
        assert_eq!(identifier.id(), "12345");
        assert_eq!(identifier.name(), "12345");
        assert_eq!(identifier.file_stem(), "12345");
        assert!(!identifier.has_custom_name());
    }

    #[test]
    fn test_identifier_with_name_uses_name_as_stem() {
        let identifier = Identifier::with_name("12345", "smith_2019");
        assert_eq!(identifier.id(), "12345");
        assert_eq!(identifier.name(), "smith_2019");
        assert_eq!(identifier.file_stem(), "smith_2019");
        assert!(identifier.has_custom_name());
    }

    #[test]
    fn test_identifier_with_same_name_is_unnamed() {
        let identifier = Identifier::with_name("777", "777");
        assert!(!identifier.has_custom_name());
        assert_eq!(identifier, Identifier::new("777"));
    }

    #[test]
    fn test_identifier_display() {
        assert_eq!(Identifier::new("1").to_string(), "1");
        assert_eq!(Identifier::with_name("1", "one").to_string(), "1 (one)");
    }
}
