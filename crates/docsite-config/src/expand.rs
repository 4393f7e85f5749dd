//! Environment variable expansion for URL-valued settings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::error::{ConfigError, FieldPath};

/// Expand environment variable references in a configuration string.
///
/// Values without `${` are returned unchanged. Bare `$VAR` is left alone so
/// URLs containing a literal dollar sign survive.
pub(crate) fn expand_env(value: &str, field: &FieldPath) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_string(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Name of a variable that was referenced but not set.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> FieldPath {
        FieldPath::from("plugins[0].editUrl")
    }

    #[test]
    fn test_literal_value_unchanged() {
        let result = expand_env("https://github.com/acme/site/", &field()).unwrap();
        assert_eq!(result, "https://github.com/acme/site/");
    }

    #[test]
    fn test_expands_embedded_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("DOCSITE_TEST_ORG", "acme");
        }
        let result = expand_env("https://github.com/${DOCSITE_TEST_ORG}/site/", &field()).unwrap();
        assert_eq!(result, "https://github.com/acme/site/");
        unsafe {
            std::env::remove_var("DOCSITE_TEST_ORG");
        }
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("DOCSITE_TEST_UNSET_HOST");
        }
        let result = expand_env(
            "https://${DOCSITE_TEST_UNSET_HOST:-docs.example.com}",
            &field(),
        )
        .unwrap();
        assert_eq!(result, "https://docs.example.com");
    }

    #[test]
    fn test_missing_var_names_field_and_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("DOCSITE_TEST_MISSING");
        }
        let err = expand_env("${DOCSITE_TEST_MISSING}", &field()).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("DOCSITE_TEST_MISSING"));
        assert!(msg.contains("plugins[0].editUrl"));
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("https://example.com/$path", &field()).unwrap();
        assert_eq!(result, "https://example.com/$path");
    }
}
