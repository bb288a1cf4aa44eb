//! Persisting fetched documents to the output directory.
//!
//! A document is written as `{stem}.pdf` when its body looks binary and as
//! `{stem}.html` otherwise. Either file marks an identifier as already
//! downloaded.
//!
//! # Example
//!
//! ```no_run
//! use reprint_core::download::DocumentStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DocumentStore::new("./papers");
//! store.ensure_output_dir().await?;
//! let saved = store.save("31452104", b"%PDF-1.7 ...").await?;
//! println!("Saved: {}", saved.path.display());
//! # Ok(())
//! # }
//! ```

mod error;
mod store;

pub use error::DownloadError;
pub use store::{DocumentKind, DocumentStore, SavedDocument};
