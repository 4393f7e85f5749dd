//! Site-wide settings: `docsite.toml`.
//!
//! ```toml
//! title = "Tiger Grades"
//! tagline = "Education intelligence for teachers"
//! url = "https://docs.example.com"
//! baseUrl = "/"
//! onBrokenLinks = "fail-build"
//! onBrokenMarkdownLinks = "warn"
//!
//! [i18n]
//! defaultLocale = "en"
//! locales = ["en"]
//! ```
//!
//! Plugins and theme sections are described in [`crate::plugin`] and
//! [`crate::theme`].
//!
//! ## Environment Variable Expansion
//!
//! `url` and every plugin `editUrl` support `${VAR}` and `${VAR:-default}`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_path_to_error::Segment;

use crate::error::{ConfigError, FieldPath, SchemaError};
use crate::expand::expand_env;
use crate::plugin::{ContentPlugin, DocsPlugin, RawPlugin};
use crate::policy::Severity;
use crate::theme::{RawTheme, Theme};
use crate::validate::{
    optional_string, parse_choice, require_http_url, require_non_empty, require_unique, required,
    required_string,
};

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "docsite.toml";

/// Locale used when no `[i18n]` section is present.
pub const DEFAULT_LOCALE: &str = "en";

/// Validated site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub title: String,
    pub tagline: String,
    pub favicon: Option<String>,
    /// Scheme and host the site is deployed to.
    pub url: String,
    /// Path prefix under `url`; always starts and ends with `/`.
    pub base_url: String,
    pub organization_name: Option<String>,
    pub project_name: Option<String>,
    pub on_broken_links: Severity,
    pub on_broken_markdown_links: Severity,
    pub i18n: I18n,
    pub plugins: Vec<ContentPlugin>,
    pub theme: Theme,
}

/// Supported locales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct I18n {
    /// Always a member of `locales`.
    pub default_locale: String,
    pub locales: Vec<String>,
}

impl Default for I18n {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_owned(),
            locales: vec![DEFAULT_LOCALE.to_owned()],
        }
    }
}

impl SiteConfig {
    /// Parse and validate `docsite.toml` contents.
    ///
    /// Unknown keys are logged and otherwise ignored.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(content)?;

        let mut ignored = Vec::new();
        let mut track = serde_path_to_error::Track::new();
        let deserializer =
            serde_path_to_error::Deserializer::new(toml::Value::Table(table), &mut track);
        let result: Result<RawSiteConfig, toml::de::Error> =
            serde_ignored::deserialize(deserializer, |path| {
                ignored.push(path.to_string());
            });
        let mut raw = result.map_err(|err| {
            SchemaError::new(field_path(&track.path()), err.message().to_owned())
        })?;
        for field in &ignored {
            tracing::warn!(field = %field, "Ignoring unknown config field");
        }

        raw.expand_env_vars()?;
        Ok(raw.resolve()?)
    }

    /// Load and validate a site configuration file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            plugins = config.plugins.len(),
            "Loaded site config"
        );
        Ok(config)
    }

    /// Search for `docsite.toml` in `start` and its parents.
    #[must_use]
    pub fn discover(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Canonical prefix of every generated page, e.g. `https://example.com/docs/`.
    #[must_use]
    pub fn site_url(&self) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), self.base_url)
    }

    /// Absolute URL of a site-relative path.
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.site_url(), path.trim_start_matches('/'))
    }

    /// GitHub repository derived from `organizationName` and `projectName`.
    #[must_use]
    pub fn repository_url(&self) -> Option<String> {
        match (&self.organization_name, &self.project_name) {
            (Some(org), Some(project)) => Some(format!("https://github.com/{org}/{project}")),
            _ => None,
        }
    }

    /// Configured docs plugins, in order.
    pub fn docs_plugins(&self) -> impl Iterator<Item = &DocsPlugin> {
        self.plugins.iter().filter_map(|plugin| match plugin {
            ContentPlugin::Docs(docs) => Some(docs),
            ContentPlugin::Blog(_) => None,
        })
    }

    /// Docs plugin with the given id.
    #[must_use]
    pub fn docs_plugin(&self, id: &str) -> Option<&DocsPlugin> {
        self.docs_plugins().find(|docs| docs.id == id)
    }
}

/// Raw site configuration as parsed from TOML.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSiteConfig {
    title: Option<String>,
    tagline: Option<String>,
    favicon: Option<String>,
    url: Option<String>,
    base_url: Option<String>,
    organization_name: Option<String>,
    project_name: Option<String>,
    on_broken_links: Option<String>,
    on_broken_markdown_links: Option<String>,
    i18n: Option<RawI18n>,
    #[serde(default)]
    plugins: Vec<RawPlugin>,
    #[serde(default)]
    theme: RawTheme,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawI18n {
    default_locale: Option<String>,
    locales: Option<Vec<String>>,
}

impl RawSiteConfig {
    /// Expand environment variable references in URL-valued fields.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let root = FieldPath::root();
        if let Some(ref url) = self.url {
            self.url = Some(expand_env(url, &root.field("url"))?);
        }
        let plugins_path = root.field("plugins");
        for (i, plugin) in self.plugins.iter_mut().enumerate() {
            plugin.expand_env_vars(&plugins_path.index(i))?;
        }
        Ok(())
    }

    fn resolve(self) -> Result<SiteConfig, SchemaError> {
        let root = FieldPath::root();

        let title = required_string(self.title, &root.field("title"))?;

        let url_path = root.field("url");
        let url = required_string(self.url, &url_path)?;
        validate_url(&url, &url_path)?;

        let base_url_path = root.field("baseUrl");
        let base_url = required(self.base_url, &base_url_path)?;
        validate_base_url(&base_url, &base_url_path)?;

        let i18n = match self.i18n {
            Some(i18n) => i18n.resolve(&root.field("i18n"))?,
            None => I18n::default(),
        };

        let plugins_path = root.field("plugins");
        let plugins: Vec<ContentPlugin> = self
            .plugins
            .into_iter()
            .enumerate()
            .map(|(i, plugin)| plugin.resolve(&plugins_path.index(i)))
            .collect::<Result<_, _>>()?;
        check_unique_plugin_ids(&plugins, &plugins_path)?;

        Ok(SiteConfig {
            title,
            tagline: self.tagline.unwrap_or_default(),
            favicon: optional_string(self.favicon, &root.field("favicon"))?,
            url,
            base_url,
            organization_name: optional_string(
                self.organization_name,
                &root.field("organizationName"),
            )?,
            project_name: optional_string(self.project_name, &root.field("projectName"))?,
            on_broken_links: parse_choice(
                self.on_broken_links.as_deref(),
                &root.field("onBrokenLinks"),
                Severity::FailBuild,
            )?,
            on_broken_markdown_links: parse_choice(
                self.on_broken_markdown_links.as_deref(),
                &root.field("onBrokenMarkdownLinks"),
                Severity::Warn,
            )?,
            i18n,
            plugins,
            theme: self.theme.resolve(&root.field("theme"))?,
        })
    }
}

impl RawI18n {
    fn resolve(self, path: &FieldPath) -> Result<I18n, SchemaError> {
        let locales_path = path.field("locales");
        let locales = required(self.locales, &locales_path)?;
        if locales.is_empty() {
            return Err(SchemaError::new(locales_path, "at least one locale is required"));
        }
        for (i, locale) in locales.iter().enumerate() {
            require_non_empty(locale, &locales_path.index(i))?;
        }
        require_unique(locales.iter().map(String::as_str), &locales_path)?;

        let default_path = path.field("defaultLocale");
        let default_locale = required_string(self.default_locale, &default_path)?;
        if !locales.contains(&default_locale) {
            return Err(SchemaError::new(
                default_path,
                format!(
                    "\"{default_locale}\" is not one of the configured locales ({})",
                    locales.join(", ")
                ),
            ));
        }

        Ok(I18n {
            default_locale,
            locales,
        })
    }
}

/// Convert the location of a mistyped value into a [`FieldPath`].
fn field_path(path: &serde_path_to_error::Path) -> FieldPath {
    path.iter()
        .fold(FieldPath::root(), |acc, segment| match segment {
            Segment::Seq { index } => acc.index(*index),
            Segment::Map { key } | Segment::Enum { variant: key } => acc.field(key),
            Segment::Unknown => acc,
        })
}

/// `url` is scheme and host only; paths belong in `baseUrl`.
fn validate_url(url: &str, path: &FieldPath) -> Result<(), SchemaError> {
    require_http_url(url, path)?;
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    if after_scheme.trim_end_matches('/').contains('/') {
        return Err(SchemaError::new(
            path.clone(),
            "must not contain a path; put it in baseUrl",
        ));
    }
    Ok(())
}

fn validate_base_url(base_url: &str, path: &FieldPath) -> Result<(), SchemaError> {
    if !base_url.starts_with('/') {
        return Err(SchemaError::new(path.clone(), "must start with /"));
    }
    if !base_url.ends_with('/') {
        return Err(SchemaError::new(path.clone(), "must end with /"));
    }
    Ok(())
}

/// Plugin ids must be unique among plugins of the same kind.
fn check_unique_plugin_ids(plugins: &[ContentPlugin], path: &FieldPath) -> Result<(), SchemaError> {
    for (i, plugin) in plugins.iter().enumerate() {
        let earlier = plugins[..i]
            .iter()
            .any(|other| other.kind() == plugin.kind() && other.id() == plugin.id());
        if earlier {
            return Err(SchemaError::new(
                path.index(i).field("id"),
                format!(
                    "another {} plugin already uses id \"{}\"",
                    plugin.kind(),
                    plugin.id()
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{BlogPlugin, FeedOptions, FeedType};
    use crate::theme::{CodeHighlighting, Footer, Navbar};
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r#"
title = "Docs"
url = "https://docs.example.com"
baseUrl = "/"
"#;

    fn schema_error(content: &str) -> SchemaError {
        match SiteConfig::from_toml_str(content) {
            Err(ConfigError::Schema(err)) => err,
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = SiteConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(
            config,
            SiteConfig {
                title: "Docs".to_owned(),
                tagline: String::new(),
                favicon: None,
                url: "https://docs.example.com".to_owned(),
                base_url: "/".to_owned(),
                organization_name: None,
                project_name: None,
                on_broken_links: Severity::FailBuild,
                on_broken_markdown_links: Severity::Warn,
                i18n: I18n::default(),
                plugins: Vec::new(),
                theme: Theme {
                    image: None,
                    custom_css: None,
                    navbar: Navbar::default(),
                    footer: Footer::default(),
                    code_highlighting: CodeHighlighting::default(),
                },
            }
        );
    }

    #[test]
    fn test_load_twice_is_identical() {
        let first = SiteConfig::from_toml_str(MINIMAL).unwrap();
        let second = SiteConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_title() {
        let err = schema_error("url = \"https://a.example\"\nbaseUrl = \"/\"\n");
        assert_eq!(err.path.as_str(), "title");
        assert!(err.reason.contains("missing"));
    }

    #[test]
    fn test_missing_base_url() {
        let err = schema_error("title = \"Docs\"\nurl = \"https://a.example\"\n");
        assert_eq!(err.path.as_str(), "baseUrl");
    }

    #[test]
    fn test_base_url_without_leading_slash() {
        let err = schema_error(
            r#"
title = "Docs"
url = "https://docs.example.com"
baseUrl = "no-leading-slash/"
"#,
        );
        assert_eq!(err.path.as_str(), "baseUrl");
        assert!(err.reason.contains("start with /"));
    }

    #[test]
    fn test_base_url_without_trailing_slash() {
        let err = schema_error(
            r#"
title = "Docs"
url = "https://docs.example.com"
baseUrl = "/docs"
"#,
        );
        assert_eq!(err.path.as_str(), "baseUrl");
        assert!(err.reason.contains("end with /"));
    }

    #[test]
    fn test_url_with_path_rejected() {
        let err = schema_error(
            r#"
title = "Docs"
url = "https://example.com/docs"
baseUrl = "/"
"#,
        );
        assert_eq!(err.path.as_str(), "url");
        assert!(err.reason.contains("baseUrl"));
    }

    #[test]
    fn test_url_trailing_slash_allowed() {
        let config = SiteConfig::from_toml_str(
            r#"
title = "Docs"
url = "https://example.com/"
baseUrl = "/handbook/"
"#,
        )
        .unwrap();
        assert_eq!(config.site_url(), "https://example.com/handbook/");
        assert_eq!(
            config.absolute_url("/docs/intro"),
            "https://example.com/handbook/docs/intro"
        );
    }

    #[test]
    fn test_default_locale_not_in_locales() {
        let err = schema_error(&format!(
            "{MINIMAL}\n[i18n]\ndefaultLocale = \"fr\"\nlocales = [\"en\", \"de\"]\n"
        ));
        assert_eq!(err.path.as_str(), "i18n.defaultLocale");
        assert!(err.reason.contains("en, de"));
    }

    #[test]
    fn test_i18n_requires_locales() {
        let err = schema_error(&format!("{MINIMAL}\n[i18n]\ndefaultLocale = \"en\"\n"));
        assert_eq!(err.path.as_str(), "i18n.locales");
    }

    #[test]
    fn test_duplicate_locale() {
        let err = schema_error(&format!(
            "{MINIMAL}\n[i18n]\ndefaultLocale = \"en\"\nlocales = [\"en\", \"en\"]\n"
        ));
        assert_eq!(err.path.as_str(), "i18n.locales[1]");
    }

    #[test]
    fn test_invalid_broken_link_policy() {
        let err = schema_error(&format!("onBrokenLinks = \"explode\"\n{MINIMAL}"));
        assert_eq!(err.path.as_str(), "onBrokenLinks");
    }

    #[test]
    fn test_throw_alias_for_broken_links() {
        let config =
            SiteConfig::from_toml_str(&format!("onBrokenLinks = \"throw\"\n{MINIMAL}")).unwrap();
        assert!(config.on_broken_links.is_fatal());
    }

    #[test]
    fn test_empty_organization_name_rejected() {
        let err = schema_error(&format!("organizationName = \"\"\n{MINIMAL}"));
        assert_eq!(err.path.as_str(), "organizationName");
    }

    #[test]
    fn test_repository_url() {
        let config = SiteConfig::from_toml_str(&format!(
            "organizationName = \"acme\"\nprojectName = \"handbook\"\n{MINIMAL}"
        ))
        .unwrap();
        assert_eq!(
            config.repository_url().as_deref(),
            Some("https://github.com/acme/handbook")
        );
    }

    #[test]
    fn test_duplicate_plugin_ids_per_kind() {
        let err = schema_error(&format!(
            "{MINIMAL}
[[plugins]]
kind = \"docs\"

[[plugins]]
kind = \"blog\"

[[plugins]]
kind = \"docs\"
"
        ));
        assert_eq!(err.path.as_str(), "plugins[2].id");
    }

    #[test]
    fn test_plugins_preserve_order() {
        let config = SiteConfig::from_toml_str(&format!(
            "{MINIMAL}
[[plugins]]
kind = \"blog\"

[[plugins]]
kind = \"docs\"
id = \"api\"
sidebarPath = \"api.yaml\"
"
        ))
        .unwrap();
        assert_eq!(
            config.plugins[0],
            ContentPlugin::Blog(BlogPlugin {
                id: "default".to_owned(),
                path: "blog".to_owned(),
                route_base_path: "blog".to_owned(),
                show_reading_time: true,
                edit_url: None,
                on_inline_tags: Severity::Warn,
                on_inline_authors: Severity::Warn,
                on_untruncated_blog_posts: Severity::Warn,
                feed_options: FeedOptions {
                    types: vec![FeedType::Rss, FeedType::Atom],
                    xslt: false,
                },
            })
        );
        let api = config.docs_plugin("api").unwrap();
        assert_eq!(api.sidebar_path.as_deref(), Some("api.yaml"));
        assert!(config.docs_plugin("default").is_none());
    }

    #[test]
    fn test_unknown_fields_are_not_fatal() {
        let config =
            SiteConfig::from_toml_str(&format!("future = {{ v4 = true }}\n{MINIMAL}")).unwrap();
        assert_eq!(config.title, "Docs");
    }

    #[test]
    fn test_wrong_type_title() {
        let err = schema_error("title = 42\nurl = \"https://a.example\"\nbaseUrl = \"/\"\n");
        assert_eq!(err.path.as_str(), "title");
        assert!(err.reason.contains("invalid type"));
    }

    #[test]
    fn test_wrong_type_policy() {
        let err = schema_error(&format!("onBrokenLinks = true\n{MINIMAL}"));
        assert_eq!(err.path.as_str(), "onBrokenLinks");
    }

    #[test]
    fn test_wrong_type_nav_item_label_keeps_index() {
        let err = schema_error(&format!(
            r#"{MINIMAL}
[[theme.navbar.items]]
to = "/a"
label = "A"

[[theme.navbar.items]]
to = "/b"
label = "B"

[[theme.navbar.items]]
to = "/c"
label = 7
"#
        ));
        assert_eq!(err.path.as_str(), "theme.navbar.items[2].label");
    }

    #[test]
    fn test_wrong_type_nav_item_position() {
        let err = schema_error(&format!(
            "{MINIMAL}\n[[theme.navbar.items]]\nto = \"/a\"\nlabel = \"A\"\nposition = 3\n"
        ));
        assert_eq!(err.path.as_str(), "theme.navbar.items[0].position");
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let result = SiteConfig::from_toml_str("title = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_expand_env_vars_url() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("DOCSITE_TEST_SITE_HOST", "preview.example.com");
        }
        let config = SiteConfig::from_toml_str(
            r#"
title = "Docs"
url = "https://${DOCSITE_TEST_SITE_HOST}"
baseUrl = "/"
"#,
        )
        .unwrap();
        assert_eq!(config.url, "https://preview.example.com");
        unsafe {
            std::env::remove_var("DOCSITE_TEST_SITE_HOST");
        }
    }

    #[test]
    fn test_expand_env_vars_missing() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("DOCSITE_TEST_MISSING_URL");
        }
        let result = SiteConfig::from_toml_str(
            r#"
title = "Docs"
url = "${DOCSITE_TEST_MISSING_URL}"
baseUrl = "/"
"#,
        );
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("url"));
    }

    #[test]
    fn test_discover_walks_up() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILENAME), MINIMAL).unwrap();

        let found = SiteConfig::discover(&nested).unwrap();
        assert_eq!(found, temp_dir.path().join(CONFIG_FILENAME));
    }

    #[test]
    fn test_load_from_file_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = SiteConfig::load_from_file(&temp_dir.path().join(CONFIG_FILENAME));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
