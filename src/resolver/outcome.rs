//! Terminal result of resolving one identifier.

use std::fmt;
use std::path::PathBuf;

/// Why an identifier could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// No strategy recognised the landing page.
    NoStrategyMatched,
    /// The landing URL belongs to a platform that cannot be scraped.
    UnsupportedPlatform {
        /// The marker found in the landing URL.
        marker: String,
    },
    /// Requests kept failing, or failed in a way that retrying cannot fix.
    FetchFailed {
        /// Rendered error of the last attempt.
        error: String,
        /// Attempts made, including the first.
        attempts: u32,
    },
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoStrategyMatched => f.write_str("no strategy matched the landing page"),
            Self::UnsupportedPlatform { marker } => {
                write!(f, "unsupported platform ('{marker}' in landing URL)")
            }
            Self::FetchFailed { error, attempts } => {
                write!(f, "fetch failed after {attempts} attempt(s): {error}")
            }
        }
    }
}

/// Exactly one of these is produced for every identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A document was found and written.
    Resolved {
        /// Document URL selected by the strategy.
        url: String,
        /// Where it was written.
        path: PathBuf,
        /// Name of the strategy that matched.
        finder: &'static str,
    },
    /// The document was already present; nothing was fetched.
    Skipped {
        /// The existing file.
        path: PathBuf,
    },
    /// No document could be obtained.
    Unresolved(UnresolvedReason),
}

impl Outcome {
    /// Returns true for `Unresolved`.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved(_))
    }

    /// Returns true for `Resolved` and `Skipped`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.is_unresolved()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved { path, finder, .. } => {
                write!(f, "resolved via {finder} -> {}", path.display())
            }
            Self::Skipped { path } => write!(f, "already downloaded: {}", path.display()),
            Self::Unresolved(reason) => write!(f, "unresolved: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_success_flags() {
        assert!(
            Outcome::Skipped {
                path: PathBuf::from("out/1.pdf")
            }
            .is_success()
        );
        assert!(Outcome::Unresolved(UnresolvedReason::NoStrategyMatched).is_unresolved());
    }

    #[test]
    fn test_unresolved_display() {
        let outcome = Outcome::Unresolved(UnresolvedReason::UnsupportedPlatform {
            marker: "ovid".to_string(),
        });
        assert_eq!(
            outcome.to_string(),
            "unresolved: unsupported platform ('ovid' in landing URL)"
        );
        let failed = UnresolvedReason::FetchFailed {
            error: "timeout fetching http://x".to_string(),
            attempts: 3,
        };
        assert_eq!(
            failed.to_string(),
            "fetch failed after 3 attempt(s): timeout fetching http://x"
        );
    }
}
