//! Content plugins: `[[plugins]]` entries.
//!
//! ```toml
//! [[plugins]]
//! kind = "docs"
//! sidebarPath = "sidebars.yaml"
//! editUrl = "https://github.com/acme/site/tree/main/docs/"
//!
//! [[plugins]]
//! kind = "blog"
//! onInlineTags = "warn"
//! feedOptions = { type = ["rss", "atom"], xslt = true }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, FieldPath, SchemaError};
use crate::expand::expand_env;
use crate::policy::Severity;
use crate::validate::{
    Choice, lookup_choice, optional_string, parse_choice, require_http_url, require_unique,
    required,
};

/// Plugin id used when none is configured.
pub const DEFAULT_PLUGIN_ID: &str = "default";

/// Configured content source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentPlugin {
    Docs(DocsPlugin),
    Blog(BlogPlugin),
}

impl ContentPlugin {
    /// Plugin id, unique among plugins of the same kind.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Docs(docs) => &docs.id,
            Self::Blog(blog) => &blog.id,
        }
    }

    /// Kind name as written in the config.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Docs(_) => "docs",
            Self::Blog(_) => "blog",
        }
    }
}

/// Documentation pages plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsPlugin {
    pub id: String,
    /// Content directory, relative to the site root.
    pub path: String,
    /// URL prefix the docs are served under.
    pub route_base_path: String,
    /// Sidebar file, relative to the config file. `None` means one
    /// autogenerated sidebar.
    pub sidebar_path: Option<String>,
    /// Prefix for "edit this page" links.
    pub edit_url: Option<String>,
}

impl DocsPlugin {
    /// Edit link for a document path relative to the content directory.
    #[must_use]
    pub fn edit_url_for(&self, doc_path: &str) -> Option<String> {
        self.edit_url.as_deref().map(|base| join_url(base, doc_path))
    }
}

/// Blog plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPlugin {
    pub id: String,
    pub path: String,
    pub route_base_path: String,
    pub show_reading_time: bool,
    pub edit_url: Option<String>,
    /// Tags declared inline in a post instead of the tags file.
    pub on_inline_tags: Severity,
    /// Authors declared inline in a post instead of the authors file.
    pub on_inline_authors: Severity,
    /// Posts without a truncation marker.
    pub on_untruncated_blog_posts: Severity,
    pub feed_options: FeedOptions,
}

impl BlogPlugin {
    /// Edit link for a post path relative to the blog directory.
    #[must_use]
    pub fn edit_url_for(&self, post_path: &str) -> Option<String> {
        self.edit_url.as_deref().map(|base| join_url(base, post_path))
    }
}

/// Blog feed generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedOptions {
    /// Enabled formats, in authored order. Empty disables feeds.
    #[serde(rename = "type")]
    pub types: Vec<FeedType>,
    /// Attach an XSLT stylesheet so browsers render the feed.
    pub xslt: bool,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            types: vec![FeedType::Rss, FeedType::Atom],
            xslt: false,
        }
    }
}

/// Feed format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    Rss,
    Atom,
    Json,
}

impl Choice for FeedType {
    const VARIANTS: &'static [(&'static str, Self)] = &[
        ("rss", Self::Rss),
        ("atom", Self::Atom),
        ("json", Self::Json),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PluginKind {
    Docs,
    Blog,
}

impl Choice for PluginKind {
    const VARIANTS: &'static [(&'static str, Self)] = &[("docs", Self::Docs), ("blog", Self::Blog)];
}

/// Raw plugin entry as parsed from TOML.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPlugin {
    kind: Option<String>,
    id: Option<String>,
    path: Option<String>,
    route_base_path: Option<String>,
    sidebar_path: Option<String>,
    edit_url: Option<String>,
    show_reading_time: Option<bool>,
    on_inline_tags: Option<String>,
    on_inline_authors: Option<String>,
    on_untruncated_blog_posts: Option<String>,
    feed_options: Option<RawFeedOptions>,
}

#[derive(Debug, Deserialize)]
struct RawFeedOptions {
    #[serde(rename = "type")]
    types: Option<OneOrMany>,
    xslt: Option<bool>,
}

/// `"all"` or a list of formats.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl RawPlugin {
    /// Expand environment variables in `editUrl`.
    pub(crate) fn expand_env_vars(&mut self, path: &FieldPath) -> Result<(), ConfigError> {
        if let Some(ref url) = self.edit_url {
            self.edit_url = Some(expand_env(url, &path.field("editUrl"))?);
        }
        Ok(())
    }

    pub(crate) fn resolve(self, path: &FieldPath) -> Result<ContentPlugin, SchemaError> {
        let kind_path = path.field("kind");
        let kind: PluginKind = lookup_choice(&required(self.kind, &kind_path)?, &kind_path)?;

        let id = optional_string(self.id, &path.field("id"))?
            .unwrap_or_else(|| DEFAULT_PLUGIN_ID.to_owned());
        let edit_url = self.edit_url;
        if let Some(ref url) = edit_url {
            require_http_url(url, &path.field("editUrl"))?;
        }
        let content_path = optional_string(self.path, &path.field("path"))?;

        match kind {
            PluginKind::Docs => {
                let blog_only = [
                    ("showReadingTime", self.show_reading_time.is_some()),
                    ("onInlineTags", self.on_inline_tags.is_some()),
                    ("onInlineAuthors", self.on_inline_authors.is_some()),
                    ("onUntruncatedBlogPosts", self.on_untruncated_blog_posts.is_some()),
                    ("feedOptions", self.feed_options.is_some()),
                ];
                if let Some((field, _)) = blog_only.iter().find(|(_, set)| *set) {
                    return Err(SchemaError::new(
                        path.field(field),
                        "only valid for blog plugins",
                    ));
                }

                Ok(ContentPlugin::Docs(DocsPlugin {
                    id,
                    path: content_path.unwrap_or_else(|| "docs".to_owned()),
                    route_base_path: self.route_base_path.unwrap_or_else(|| "docs".to_owned()),
                    sidebar_path: optional_string(self.sidebar_path, &path.field("sidebarPath"))?,
                    edit_url,
                }))
            }
            PluginKind::Blog => {
                if self.sidebar_path.is_some() {
                    return Err(SchemaError::new(
                        path.field("sidebarPath"),
                        "only valid for docs plugins",
                    ));
                }

                let feed_options = match self.feed_options {
                    Some(feed) => feed.resolve(&path.field("feedOptions"))?,
                    None => FeedOptions::default(),
                };

                Ok(ContentPlugin::Blog(BlogPlugin {
                    id,
                    path: content_path.unwrap_or_else(|| "blog".to_owned()),
                    route_base_path: self.route_base_path.unwrap_or_else(|| "blog".to_owned()),
                    show_reading_time: self.show_reading_time.unwrap_or(true),
                    edit_url,
                    on_inline_tags: parse_choice(
                        self.on_inline_tags.as_deref(),
                        &path.field("onInlineTags"),
                        Severity::Warn,
                    )?,
                    on_inline_authors: parse_choice(
                        self.on_inline_authors.as_deref(),
                        &path.field("onInlineAuthors"),
                        Severity::Warn,
                    )?,
                    on_untruncated_blog_posts: parse_choice(
                        self.on_untruncated_blog_posts.as_deref(),
                        &path.field("onUntruncatedBlogPosts"),
                        Severity::Warn,
                    )?,
                    feed_options,
                }))
            }
        }
    }
}

impl RawFeedOptions {
    fn resolve(self, path: &FieldPath) -> Result<FeedOptions, SchemaError> {
        let types_path = path.field("type");
        let types = match self.types {
            None => FeedOptions::default().types,
            Some(OneOrMany::One(value)) if value == "all" => {
                vec![FeedType::Rss, FeedType::Atom, FeedType::Json]
            }
            Some(OneOrMany::One(value)) => vec![lookup_choice(&value, &types_path)?],
            Some(OneOrMany::Many(values)) => {
                require_unique(values.iter().map(String::as_str), &types_path)?;
                values
                    .iter()
                    .enumerate()
                    .map(|(i, value)| lookup_choice(value, &types_path.index(i)))
                    .collect::<Result<_, _>>()?
            }
        };

        Ok(FeedOptions {
            types,
            xslt: self.xslt.unwrap_or(false),
        })
    }
}

/// Join an edit URL prefix and a relative content path.
fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
