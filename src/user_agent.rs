//! User-Agent strings for outbound requests.
//!
//! Several publisher sites reject non-browser clients outright, so every
//! request identifies as a desktop browser unless the config overrides it.

/// Browser User-Agent sent with every redirector, landing-page and document request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Returns the User-Agent to use, preferring a non-empty override.
#[must_use]
pub fn effective_user_agent(override_ua: Option<&str>) -> String {
    override_ua
        .map(str::trim)
        .filter(|ua| !ua.is_empty())
        .unwrap_or(BROWSER_USER_AGENT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_user_agent_looks_like_a_browser() {
        assert!(BROWSER_USER_AGENT.starts_with("Mozilla/5.0"));
        assert!(BROWSER_USER_AGENT.contains("Chrome/"));
        assert!(!BROWSER_USER_AGENT.contains("reqwest"));
    }

    #[test]
    fn test_effective_user_agent_override_and_fallback() {
        assert_eq!(effective_user_agent(None), BROWSER_USER_AGENT);
        assert_eq!(effective_user_agent(Some("   ")), BROWSER_USER_AGENT);
        assert_eq!(effective_user_agent(Some(" custom/1.0 ")), "custom/1.0");
    }
}
