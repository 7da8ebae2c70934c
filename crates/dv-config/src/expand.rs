//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::ConfigError;

/// Expand `${}` references using a caller-supplied variable lookup.
///
/// Returns the original string unchanged if no `${}` patterns are present.
/// Bare `$VAR` syntax is not expanded (only `${VAR}` with braces).
pub(crate) fn expand_with(
    value: &str,
    field: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    // Unset variables without a default are left verbatim by shellexpand.
    let expanded = shellexpand::env_with_context_no_errors(value, |var| lookup(var));

    match unresolved_reference(&expanded) {
        Some(var_name) => Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{var_name}}} not set"),
        }),
        None => Ok(expanded.into_owned()),
    }
}

/// Name of the first `${VAR}` reference still present after expansion.
fn unresolved_reference(value: &str) -> Option<&str> {
    let start = value.find("${")? + 2;
    let len = value[start..].find('}')?;
    Some(&value[start..start + len])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(var: &str) -> Option<String> {
        match var {
            "DOCS_HOME" => Some("/srv/docs".to_owned()),
            "HOST_TEST" => Some("example.com".to_owned()),
            _ => None,
        }
    }

    #[test]
    fn test_expand_simple_var() {
        let result = expand_with("${DOCS_HOME}", "content.root", env).unwrap();
        assert_eq!(result, "/srv/docs");
    }

    #[test]
    fn test_expand_with_default_uses_value() {
        let result = expand_with("${DOCS_HOME:-/tmp}", "content.root", env).unwrap();
        assert_eq!(result, "/srv/docs");
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        let result = expand_with("${UNSET_VAR:-fallback}", "content.root", env).unwrap();
        assert_eq!(result, "fallback");
    }

    #[test]
    fn test_expand_missing_var_error() {
        let err = expand_with("${MISSING_VAR}", "content.public_base", env).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR"));
        assert!(err.to_string().contains("content.public_base"));
    }

    #[test]
    fn test_expand_literal_unchanged() {
        let result = expand_with("literal string", "test.field", env).unwrap();
        assert_eq!(result, "literal string");
    }

    #[test]
    fn test_expand_embedded_var() {
        let result = expand_with("https://${HOST_TEST}/docs", "test.url", env).unwrap();
        assert_eq!(result, "https://example.com/docs");
    }
}
