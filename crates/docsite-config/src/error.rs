//! Error types for configuration loading.

use std::fmt;
use std::path::PathBuf;

/// Dotted path to a configuration field, e.g. `theme.navbar.items[2].label`.
///
/// Paths are built incrementally while walking raw configuration values so
/// that every [`SchemaError`] names the exact field it rejects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    /// Create an empty (root) path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Path to a named child field.
    #[must_use]
    pub fn field(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_owned())
        } else {
            Self(format!("{}.{name}", self.0))
        }
    }

    /// Path to an element of a sequence field.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }

    /// The path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("(root)")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self(path.to_owned())
    }
}

/// Structural or value violation of the configuration schema.
///
/// Always fatal: loaders stop at the first violation and never return a
/// partially validated value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {reason}")]
pub struct SchemaError {
    /// Field the violation was found at.
    pub path: FieldPath,
    /// Human-readable description.
    pub reason: String,
}

impl SchemaError {
    /// Create a schema error for the given field.
    pub fn new(path: impl Into<FieldPath>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Error for a required field that is absent.
    pub fn missing(path: &FieldPath) -> Self {
        Self::new(path.clone(), "required field is missing")
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Schema violation.
    #[error("Configuration error: {0}")]
    Schema(#[from] SchemaError),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`url`").
        field: String,
        /// Error message (e.g., "${`SITE_URL`} not set").
        message: String,
    },
    /// Error in a sidebar file referenced by a docs plugin.
    #[error("In sidebar file {}: {source}", .file.display())]
    Sidebar {
        /// Sidebar file being loaded.
        file: PathBuf,
        /// Underlying failure.
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// The schema violation behind this error, if it is one.
    #[must_use]
    pub fn as_schema(&self) -> Option<&SchemaError> {
        match self {
            Self::Schema(err) => Some(err),
            Self::Sidebar { source, .. } => source.as_schema(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_nesting() {
        let path = FieldPath::root()
            .field("theme")
            .field("navbar")
            .field("items")
            .index(2)
            .field("label");
        assert_eq!(path.as_str(), "theme.navbar.items[2].label");
    }

    #[test]
    fn test_field_path_root_index() {
        let path = FieldPath::root().field("tutorialSidebar").index(0);
        assert_eq!(path.to_string(), "tutorialSidebar[0]");
    }

    #[test]
    fn test_root_path_display() {
        let err = SchemaError::new(FieldPath::root(), "expected a mapping");
        assert_eq!(err.path.as_str(), "");
        assert_eq!(err.to_string(), "(root): expected a mapping");
    }

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::new("baseUrl", "must start with /");
        assert_eq!(err.to_string(), "baseUrl: must start with /");
    }

    #[test]
    fn test_config_error_wraps_schema_error() {
        let err: ConfigError = SchemaError::missing(&FieldPath::from("title")).into();
        assert_eq!(err.as_schema().unwrap().path.as_str(), "title");
        assert!(err.to_string().contains("title: required field is missing"));
    }

    #[test]
    fn test_sidebar_error_names_file() {
        let err = ConfigError::Sidebar {
            file: PathBuf::from("site/sidebars.yaml"),
            source: Box::new(
                SchemaError::new("guide[0]", "category \"Intro\" has no items").into(),
            ),
        };
        assert_eq!(err.as_schema().unwrap().path.as_str(), "guide[0]");
        assert!(err.to_string().starts_with("In sidebar file site/sidebars.yaml: "));
    }

    #[test]
    fn test_not_found_display() {
        let err = ConfigError::NotFound(PathBuf::from("/missing/docsite.toml"));
        assert!(err.to_string().contains("/missing/docsite.toml"));
    }
}
