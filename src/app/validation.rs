use anyhow::{Result, bail};
use reprint_core::ParseResult;
use reprint_core::resolver::ID_PLACEHOLDER;

pub(crate) fn ensure_identifiers_present(result: &ParseResult) -> Result<()> {
    if result.is_empty() {
        bail!(
            "No usable identifiers found in input ({} skipped).\n  \
             Pass bare PubMed IDs, e.g. --pmids 31452104,29102234",
            result.skipped_count()
        );
    }
    Ok(())
}

pub(crate) fn validate_redirector_template(template: &str) -> Result<()> {
    if !template.contains(ID_PLACEHOLDER) {
        bail!(
            "Invalid redirector template '{template}': missing {ID_PLACEHOLDER} placeholder.\n  \
             Example: https://example.org/link?id={ID_PLACEHOLDER}"
        );
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reprint_core::parse_identifier_list;

    use super::*;

    #[test]
    fn test_empty_identifier_input_is_rejected() {
        let result = parse_identifier_list(" , ,");
        let err = ensure_identifiers_present(&result).unwrap_err();
        assert!(err.to_string().contains("No usable identifiers"), "got: {err}");
    }

    #[test]
    fn test_non_empty_identifier_input_is_accepted() {
        let result = parse_identifier_list("31452104");
        assert!(ensure_identifiers_present(&result).is_ok());
    }

    #[test]
    fn test_redirector_template_requires_placeholder() {
        assert!(validate_redirector_template("http://localhost/{id}").is_ok());
        let err = validate_redirector_template("http://localhost/").unwrap_err();
        assert!(err.to_string().contains("placeholder"), "got: {err}");
    }
}
