//! The failure ledger: identifiers that ended unresolved.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, instrument};

use crate::Identifier;

/// Default ledger filename.
pub const DEFAULT_LEDGER_PATH: &str = "failed_pubmeds.tsv";

/// Errors writing the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger file could not be written.
    #[error("failed to write failure ledger {path}: {source}")]
    Write {
        /// The ledger path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Unresolved identifiers, kept with their input position.
#[derive(Debug, Clone, Default)]
pub struct FailureLedger {
    entries: Vec<(usize, Identifier)>,
}

impl FailureLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the identifier at input position `index`.
    pub fn record(&mut self, index: usize, identifier: Identifier) {
        self.entries.push((index, identifier));
    }

    /// Number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Failed identifiers in input order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<&Identifier> {
        let mut entries: Vec<&(usize, Identifier)> = self.entries.iter().collect();
        entries.sort_by_key(|(index, _)| *index);
        entries.into_iter().map(|(_, identifier)| identifier).collect()
    }

    /// Renders one `identifier<TAB>name` line per failure, in input order.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for identifier in self.identifiers() {
            let _ = writeln!(out, "{}\t{}", identifier.id(), identifier.name());
        }
        out
    }

    /// Writes the ledger to `path`, replacing any existing file.
    ///
    /// An empty ledger still produces an (empty) file.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Write`] if the file cannot be written.
    #[instrument(level = "debug", skip(self), fields(path = %path.display(), failures = self.len()))]
    pub async fn write(&self, path: &Path) -> Result<(), LedgerError> {
        tokio::fs::write(path, self.render())
            .await
            .map_err(|source| LedgerError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), failures = self.len(), "failure ledger written");
        Ok(())
    }
}
