//! Environment variable access.

use crate::error::SwapError;

/// Trimmed value of `name`; unset or blank fails with [`SwapError::MissingEnv`].
pub fn require_env(name: &str) -> Result<String, SwapError> {
    optional_env(name).ok_or_else(|| SwapError::missing_env(name))
}

pub fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// First set variable of `names`; the error names the first one.
pub fn require_any_env(names: &[&str]) -> Result<String, SwapError> {
    names
        .iter()
        .find_map(|name| optional_env(name))
        .ok_or_else(|| SwapError::missing_env(names.first().copied().unwrap_or_default()))
}

/// Expand `${VAR_NAME}` patterns with environment variable values.
///
/// Unset variables are left as-is.
pub fn expand_env(s: &str) -> String {
    let re = match regex_lite::Regex::new(r"\$\{([^}]+)\}") {
        Ok(re) => re,
        Err(_) => return s.to_string(),
    };

    re.replace_all(s, |caps: &regex_lite::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Unique var names per test; tests run in parallel.

    #[test]
    fn test_require_env_missing() {
        std::env::remove_var("XSWAP_TEST_MISSING");
        let err = require_env("XSWAP_TEST_MISSING").unwrap_err();
        assert_eq!(err.to_string(), "XSWAP_TEST_MISSING environment variable is not set.");
    }

    #[test]
    fn test_require_env_blank_is_missing() {
        std::env::set_var("XSWAP_TEST_BLANK", "   ");
        assert!(matches!(
            require_env("XSWAP_TEST_BLANK"),
            Err(SwapError::MissingEnv { .. })
        ));
        std::env::remove_var("XSWAP_TEST_BLANK");
    }

    #[test]
    fn test_require_env_trims() {
        std::env::set_var("XSWAP_TEST_PRESENT", " value \n");
        assert_eq!(require_env("XSWAP_TEST_PRESENT").unwrap(), "value");
        std::env::remove_var("XSWAP_TEST_PRESENT");
    }

    #[test]
    fn test_require_any_env_fallback() {
        std::env::remove_var("XSWAP_TEST_PRIMARY");
        std::env::set_var("XSWAP_TEST_FALLBACK", "key");
        assert_eq!(
            require_any_env(&["XSWAP_TEST_PRIMARY", "XSWAP_TEST_FALLBACK"]).unwrap(),
            "key"
        );
        std::env::remove_var("XSWAP_TEST_FALLBACK");

        let err = require_any_env(&["XSWAP_TEST_PRIMARY", "XSWAP_TEST_FALLBACK"]).unwrap_err();
        assert_eq!(err.to_string(), "XSWAP_TEST_PRIMARY environment variable is not set.");
    }

    #[test]
    fn test_expand_env() {
        std::env::set_var("XSWAP_TEST_TOKEN", "abc123");
        assert_eq!(
            expand_env("https://eth-sepolia.g.alchemy.com/v2/${XSWAP_TEST_TOKEN}"),
            "https://eth-sepolia.g.alchemy.com/v2/abc123"
        );
        assert_eq!(expand_env("no_vars"), "no_vars");
        assert_eq!(expand_env("${XSWAP_TEST_UNSET_VAR}"), "${XSWAP_TEST_UNSET_VAR}");
        std::env::remove_var("XSWAP_TEST_TOKEN");
    }
}
