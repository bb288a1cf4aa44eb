use std::path::Path;

use anyhow::{Context, Result, bail};
use reprint_core::{ParseResult, parse_identifier_lines, parse_identifier_list};
use tracing::{info, warn};

/// Reads identifiers from exactly one of the two sources.
pub(crate) fn read_identifiers(
    pmids: Option<&str>,
    pmids_file: Option<&Path>,
) -> Result<ParseResult> {
    let result = match (pmids, pmids_file) {
        (Some(list), None) => parse_identifier_list(list),
        (None, Some(path)) => {
            let raw = std::fs::read_to_string(path).with_context(|| {
                format!("Failed to read identifier file '{}'", path.display())
            })?;
            parse_identifier_lines(&raw)
        }
        (Some(_), Some(_)) => bail!("--pmids and --pmids-file cannot be used together."),
        (None, None) => bail!("One of the two arguments '--pmids' or '--pmids-file' must be used."),
    };

    for skipped in &result.skipped {
        warn!(error = %skipped, "Skipped unusable identifier");
    }
    info!(
        identifiers = result.len(),
        skipped = result.skipped_count(),
        "Parsed input"
    );
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_read_identifiers_from_list() {
        let result = read_identifiers(Some("100,200, 300"), None).unwrap();
        let ids: Vec<&str> = result.items.iter().map(|item| item.id()).collect();
        assert_eq!(ids, vec!["100", "200", "300"]);
    }

    #[test]
    fn test_read_identifiers_from_file_with_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ids.txt");
        std::fs::write(&path, "100 smith_2019\n\n200\n").unwrap();

        let result = read_identifiers(None, Some(&path)).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.items[0].name(), "smith_2019");
        assert_eq!(result.items[1].name(), "200");
    }

    #[test]
    fn test_read_identifiers_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.txt");
        let err = read_identifiers(None, Some(&path)).unwrap_err();
        assert!(err.to_string().contains("missing.txt"), "got: {err}");
    }

    #[test]
    fn test_read_identifiers_requires_exactly_one_source() {
        let err = read_identifiers(None, None).unwrap_err();
        assert!(err.to_string().contains("must be used"), "got: {err}");

        let err = read_identifiers(Some("1"), Some(Path::new("ids.txt"))).unwrap_err();
        assert!(err.to_string().contains("cannot be used together"), "got: {err}");
    }
}
