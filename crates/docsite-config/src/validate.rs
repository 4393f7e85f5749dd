//! Field-level validation helpers shared by the loaders.

use std::collections::HashSet;

use crate::error::{FieldPath, SchemaError};

/// Closed set of string values a configuration enum accepts.
pub(crate) trait Choice: Copy + 'static {
    /// Canonical spellings, in the order they are listed in errors.
    const VARIANTS: &'static [(&'static str, Self)];
    /// Extra accepted spellings.
    const ALIASES: &'static [(&'static str, Self)] = &[];
}

/// Require an optional raw value to be present.
pub(crate) fn required<T>(value: Option<T>, path: &FieldPath) -> Result<T, SchemaError> {
    value.ok_or_else(|| SchemaError::missing(path))
}

/// Require a string field to be non-empty.
pub(crate) fn require_non_empty(value: &str, path: &FieldPath) -> Result<(), SchemaError> {
    if value.trim().is_empty() {
        return Err(SchemaError::new(path.clone(), "cannot be empty"));
    }
    Ok(())
}

/// Required, non-empty string field.
pub(crate) fn required_string(
    value: Option<String>,
    path: &FieldPath,
) -> Result<String, SchemaError> {
    let value = required(value, path)?;
    require_non_empty(&value, path)?;
    Ok(value)
}

/// Optional string field that must be non-empty when present.
pub(crate) fn optional_string(
    value: Option<String>,
    path: &FieldPath,
) -> Result<Option<String>, SchemaError> {
    if let Some(ref value) = value {
        require_non_empty(value, path)?;
    }
    Ok(value)
}

/// Require a URL field to use http:// or https:// scheme.
pub(crate) fn require_http_url(url: &str, path: &FieldPath) -> Result<(), SchemaError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
        Some(_) => Err(SchemaError::new(path.clone(), "URL is missing a host")),
        None => Err(SchemaError::new(
            path.clone(),
            "must start with http:// or https://",
        )),
    }
}

/// Parse an enum field, falling back to `default` when absent.
pub(crate) fn parse_choice<T: Choice>(
    value: Option<&str>,
    path: &FieldPath,
    default: T,
) -> Result<T, SchemaError> {
    match value {
        None => Ok(default),
        Some(value) => lookup_choice(value, path),
    }
}

/// Parse a required enum value.
pub(crate) fn lookup_choice<T: Choice>(value: &str, path: &FieldPath) -> Result<T, SchemaError> {
    T::VARIANTS
        .iter()
        .chain(T::ALIASES)
        .find(|(name, _)| *name == value)
        .map(|(_, choice)| *choice)
        .ok_or_else(|| {
            let expected: Vec<&str> = T::VARIANTS.iter().map(|(name, _)| *name).collect();
            SchemaError::new(
                path.clone(),
                format!("must be one of {} (got \"{value}\")", expected.join(", ")),
            )
        })
}

/// Reject repeated entries in a list with set semantics.
///
/// `path` is the path of the list; the error points at the repeated element.
pub(crate) fn require_unique<'a>(
    values: impl IntoIterator<Item = &'a str>,
    path: &FieldPath,
) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for (i, value) in values.into_iter().enumerate() {
        if !seen.insert(value) {
            return Err(SchemaError::new(
                path.index(i),
                format!("duplicate entry \"{value}\""),
            ));
        }
    }
    Ok(())
}
