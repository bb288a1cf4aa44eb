//! On-disk document store keyed by filename stem.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

use super::DownloadError;

/// Number of leading bytes inspected when sniffing a body.
const SNIFF_LEN: usize = 8 * 1024;

/// Kind of document written to disk, chosen by sniffing the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Binary document, saved as `.pdf`.
    Pdf,
    /// Textual response (usually an HTML page), saved as `.html`.
    Html,
}

impl DocumentKind {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
        }
    }

    /// Sniffs a response body.
    ///
    /// A body is binary when it starts with `%PDF`, or when its first bytes
    /// contain a NUL or are not valid UTF-8.
    #[must_use]
    pub fn sniff(body: &[u8]) -> Self {
        if body.starts_with(b"%PDF") {
            return Self::Pdf;
        }
        let head = &body[..body.len().min(SNIFF_LEN)];
        if head.contains(&0) {
            return Self::Pdf;
        }
        match std::str::from_utf8(head) {
            Ok(_) => Self::Html,
            // A multi-byte sequence cut at the sniff boundary is still text.
            Err(error) if error.error_len().is_none() && head.len() == SNIFF_LEN => Self::Html,
            Err(_) => Self::Pdf,
        }
    }
}

/// A document written by [`DocumentStore::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDocument {
    /// Final path of the written file.
    pub path: PathBuf,
    /// What the body was sniffed as.
    pub kind: DocumentKind,
    /// Number of bytes written.
    pub bytes: u64,
}

/// Writes fetched documents into one output directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    output_dir: PathBuf,
}

impl DocumentStore {
    /// Creates a store rooted at `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// The output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Creates the output directory if it does not exist.
    ///
    /// Returns `true` when the directory was created by this call.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] if the directory cannot be created.
    pub async fn ensure_output_dir(&self) -> Result<bool, DownloadError> {
        if tokio::fs::try_exists(&self.output_dir)
            .await
            .map_err(|e| DownloadError::io(&self.output_dir, e))?
        {
            return Ok(false);
        }
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| DownloadError::io(&self.output_dir, e))?;
        info!(path = %self.output_dir.display(), "created output directory");
        Ok(true)
    }

    /// Returns the document already saved for `stem`, if any.
    ///
    /// `{stem}.pdf` is checked before `{stem}.html`; either counts as done.
    #[must_use]
    pub fn existing_document(&self, stem: &str) -> Option<PathBuf> {
        [DocumentKind::Pdf, DocumentKind::Html]
            .into_iter()
            .map(|kind| self.output_dir.join(format!("{stem}.{}", kind.extension())))
            .find(|path| path.is_file())
    }

    /// Writes `body` to `{stem}.pdf` or `{stem}.html` depending on its content.
    ///
    /// The body is written to a `.part` sibling first and renamed into place,
    /// so a concurrent reader never observes a truncated document.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::UnsafeStem`] for stems containing path
    /// separators, and [`DownloadError::Io`] when writing or renaming fails.
    #[instrument(level = "debug", skip(self, body), fields(bytes = body.len()))]
    pub async fn save(&self, stem: &str, body: &[u8]) -> Result<SavedDocument, DownloadError> {
        if stem.is_empty()
            || stem == "."
            || stem == ".."
            || stem.contains(['/', '\\'])
            || stem.chars().any(char::is_control)
        {
            return Err(DownloadError::unsafe_stem(stem));
        }

        let kind = DocumentKind::sniff(body);
        let path = self.output_dir.join(format!("{stem}.{}", kind.extension()));
        let part_path = self
            .output_dir
            .join(format!("{stem}.{}.part", kind.extension()));

        let write_result = write_file(&part_path, body).await;
        if write_result.is_err() {
            debug!(path = %part_path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(&part_path).await;
        }
        write_result?;

        if let Err(error) = tokio::fs::rename(&part_path, &path).await {
            let _ = tokio::fs::remove_file(&part_path).await;
            return Err(DownloadError::io(&path, error));
        }

        info!(path = %path.display(), kind = kind.extension(), "document saved");
        Ok(SavedDocument {
            path,
            kind,
            bytes: body.len() as u64,
        })
    }
}

async fn write_file(path: &Path, body: &[u8]) -> Result<(), DownloadError> {
    let file = File::create(path)
        .await
        .map_err(|e| DownloadError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(body)
        .await
        .map_err(|e| DownloadError::io(path, e))?;
    writer.flush().await.map_err(|e| DownloadError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_sniff_pdf_magic() {
        assert_eq!(DocumentKind::sniff(b"%PDF-1.7\n..."), DocumentKind::Pdf);
    }

    #[test]
    fn test_sniff_binary_bytes() {
        assert_eq!(DocumentKind::sniff(b"PK\x03\x04\x00\x00"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::sniff(b"\xff\xd8\xff\xe0"), DocumentKind::Pdf);
    }

    #[test]
    fn test_sniff_text_and_empty() {
        assert_eq!(DocumentKind::sniff(b"<html>paywall</html>"), DocumentKind::Html);
        assert_eq!(DocumentKind::sniff(b""), DocumentKind::Html);
        assert_eq!(DocumentKind::sniff("caf\u{e9}".as_bytes()), DocumentKind::Html);
    }

    #[test]
    fn test_sniff_multibyte_cut_at_boundary_is_text() {
        let mut body = vec![b'a'; SNIFF_LEN - 1];
        body.extend_from_slice("\u{e9}".as_bytes());
        assert_eq!(DocumentKind::sniff(&body), DocumentKind::Html);
    }

    #[tokio::test]
    async fn test_save_pdf_writes_exact_bytes() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path());
        let saved = store.save("12345", b"%PDF-1.4 body").await.unwrap();

        assert_eq!(saved.kind, DocumentKind::Pdf);
        assert_eq!(saved.path, dir.path().join("12345.pdf"));
        assert_eq!(saved.bytes, 13);
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"%PDF-1.4 body");
        assert!(!dir.path().join("12345.pdf.part").exists());
        assert_eq!(store.existing_document("12345"), Some(saved.path));
    }

    #[tokio::test]
    async fn test_saved_html_counts_as_existing() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path());
        assert!(store.existing_document("777").is_none());

        let saved = store.save("777", b"<html>login</html>").await.unwrap();

        assert_eq!(saved.path, dir.path().join("777.html"));
        assert_eq!(store.existing_document("777"), Some(saved.path));
    }

    #[test]
    fn test_existing_pdf_wins_over_html() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("9.html"), b"<html></html>").unwrap();
        std::fs::write(dir.path().join("9.pdf"), b"%PDF").unwrap();
        let store = DocumentStore::new(dir.path());

        assert_eq!(
            store.existing_document("9"),
            Some(dir.path().join("9.pdf"))
        );
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path());
        store.save("1", b"%PDF old").await.unwrap();
        store.save("1", b"%PDF new").await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("1.pdf")).unwrap(), b"%PDF new");
    }

    #[tokio::test]
    async fn test_save_rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path());
        let error = store.save("../escape", b"%PDF").await.unwrap_err();
        assert!(matches!(error, DownloadError::UnsafeStem { .. }));
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails_with_io() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path().join("missing"));
        let error = store.save("1", b"%PDF").await.unwrap_err();
        assert!(matches!(error, DownloadError::Io { .. }));
    }

    #[tokio::test]
    async fn test_ensure_output_dir_creates_once() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path().join("nested").join("out"));
        assert!(store.ensure_output_dir().await.unwrap());
        assert!(!store.ensure_output_dir().await.unwrap());
        assert!(store.output_dir().is_dir());
    }
}
