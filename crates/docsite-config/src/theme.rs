//! `[theme]` section: navbar, footer and code highlighting.
//!
//! ```toml
//! [theme]
//! image = "img/social-card.jpg"
//!
//! [theme.navbar]
//! title = "Tiger Grades"
//! logo = { alt = "Logo", src = "img/logo.png" }
//!
//! [[theme.navbar.items]]
//! type = "docSidebar"
//! sidebarId = "tutorialSidebar"
//! label = "Documentation"
//!
//! [[theme.navbar.items]]
//! href = "https://github.com/acme/site"
//! label = "GitHub"
//! position = "right"
//!
//! [theme.footer]
//! style = "dark"
//!
//! [[theme.footer.links]]
//! title = "Docs"
//! items = [{ label = "Getting Started", to = "/docs/intro" }]
//!
//! [theme.codeHighlighting]
//! theme = "github"
//! darkTheme = "dracula"
//! additionalLanguages = ["php", "sql"]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{FieldPath, SchemaError};
use crate::validate::{
    Choice, optional_string, parse_choice, require_http_url, require_non_empty, require_unique,
    required_string,
};

/// Light-mode highlighting theme used when none is configured.
pub const DEFAULT_LIGHT_THEME: &str = "github";
/// Dark-mode highlighting theme used when none is configured.
pub const DEFAULT_DARK_THEME: &str = "dracula";

/// Theme configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// Social card image.
    pub image: Option<String>,
    /// Custom stylesheet applied on top of the theme.
    pub custom_css: Option<String>,
    /// Top navigation bar.
    pub navbar: Navbar,
    /// Page footer.
    pub footer: Footer,
    /// Syntax highlighting choices.
    pub code_highlighting: CodeHighlighting,
}

/// Top navigation bar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Navbar {
    pub title: Option<String>,
    pub logo: Option<Logo>,
    pub items: Vec<NavItem>,
}

impl Navbar {
    /// Sidebar links with their index in `items`.
    pub fn sidebar_links(&self) -> impl Iterator<Item = (usize, &str, Option<&str>)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| match &item.target {
                NavTarget::SidebarLink {
                    sidebar_id,
                    docs_plugin_id,
                } => Some((i, sidebar_id.as_str(), docs_plugin_id.as_deref())),
                NavTarget::PageLink { .. } | NavTarget::ExternalLink { .. } => None,
            })
    }
}

/// Navbar logo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Logo {
    pub alt: Option<String>,
    pub src: String,
}

/// Navbar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: String,
    pub position: Position,
    #[serde(flatten)]
    pub target: NavTarget,
}

/// What a navbar entry links to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum NavTarget {
    /// First document of a sidebar.
    #[serde(rename = "docSidebar")]
    SidebarLink {
        #[serde(rename = "sidebarId")]
        sidebar_id: String,
        /// Docs plugin owning the sidebar (`None` means the default plugin).
        #[serde(rename = "docsPluginId", skip_serializing_if = "Option::is_none")]
        docs_plugin_id: Option<String>,
    },
    /// Internal page path.
    #[serde(rename = "page")]
    PageLink { to: String },
    /// Absolute external URL.
    #[serde(rename = "external")]
    ExternalLink { href: String },
}

/// Horizontal placement of a navbar entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Left,
    Right,
}

impl Choice for Position {
    const VARIANTS: &'static [(&'static str, Self)] =
        &[("left", Self::Left), ("right", Self::Right)];
}

/// Page footer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Footer {
    pub style: FooterStyle,
    pub links: Vec<FooterColumn>,
    pub copyright: Option<String>,
}

/// Footer color scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FooterStyle {
    #[default]
    Light,
    Dark,
}

impl Choice for FooterStyle {
    const VARIANTS: &'static [(&'static str, Self)] =
        &[("light", Self::Light), ("dark", Self::Dark)];
}

/// Titled group of footer links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterColumn {
    pub title: String,
    pub items: Vec<FooterLink>,
}

/// Single footer link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterLink {
    pub label: String,
    #[serde(flatten)]
    pub target: LinkTarget,
}

/// Internal path or external URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LinkTarget {
    Internal { to: String },
    External { href: String },
}

/// Syntax highlighting configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeHighlighting {
    /// Theme name for light mode.
    pub theme: String,
    /// Theme name for dark mode.
    pub dark_theme: String,
    /// Grammars to load beyond the built-in set.
    pub additional_languages: Vec<String>,
}

impl Default for CodeHighlighting {
    fn default() -> Self {
        Self {
            theme: DEFAULT_LIGHT_THEME.to_owned(),
            dark_theme: DEFAULT_DARK_THEME.to_owned(),
            additional_languages: Vec::new(),
        }
    }
}

/// Raw theme section as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTheme {
    image: Option<String>,
    custom_css: Option<String>,
    navbar: Option<RawNavbar>,
    footer: Option<RawFooter>,
    code_highlighting: Option<RawCodeHighlighting>,
}

#[derive(Debug, Deserialize)]
struct RawNavbar {
    title: Option<String>,
    logo: Option<RawLogo>,
    #[serde(default)]
    items: Vec<RawNavItem>,
}

#[derive(Debug, Deserialize)]
struct RawLogo {
    alt: Option<String>,
    src: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNavItem {
    #[serde(rename = "type")]
    kind: Option<String>,
    sidebar_id: Option<String>,
    docs_plugin_id: Option<String>,
    to: Option<String>,
    href: Option<String>,
    label: Option<String>,
    position: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFooter {
    style: Option<String>,
    #[serde(default)]
    links: Vec<RawFooterColumn>,
    copyright: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFooterColumn {
    title: Option<String>,
    #[serde(default)]
    items: Vec<RawLink>,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    label: Option<String>,
    to: Option<String>,
    href: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCodeHighlighting {
    theme: Option<String>,
    dark_theme: Option<String>,
    #[serde(default)]
    additional_languages: Vec<String>,
}

/// Explicit `type` of a navbar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavKind {
    DocSidebar,
    Default,
}

impl Choice for NavKind {
    const VARIANTS: &'static [(&'static str, Self)] =
        &[("docSidebar", Self::DocSidebar), ("default", Self::Default)];
}

impl RawTheme {
    pub(crate) fn resolve(self, path: &FieldPath) -> Result<Theme, SchemaError> {
        let navbar = match self.navbar {
            Some(navbar) => navbar.resolve(&path.field("navbar"))?,
            None => Navbar::default(),
        };
        let footer = match self.footer {
            Some(footer) => footer.resolve(&path.field("footer"))?,
            None => Footer::default(),
        };
        let code_highlighting = match self.code_highlighting {
            Some(code) => code.resolve(&path.field("codeHighlighting"))?,
            None => CodeHighlighting::default(),
        };

        Ok(Theme {
            image: optional_string(self.image, &path.field("image"))?,
            custom_css: optional_string(self.custom_css, &path.field("customCss"))?,
            navbar,
            footer,
            code_highlighting,
        })
    }
}

impl RawNavbar {
    fn resolve(self, path: &FieldPath) -> Result<Navbar, SchemaError> {
        let logo = self
            .logo
            .map(|logo| {
                let path = path.field("logo");
                Ok::<_, SchemaError>(Logo {
                    alt: logo.alt,
                    src: required_string(logo.src, &path.field("src"))?,
                })
            })
            .transpose()?;

        let items_path = path.field("items");
        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(i, item)| item.resolve(&items_path.index(i)))
            .collect::<Result<_, _>>()?;

        Ok(Navbar {
            title: optional_string(self.title, &path.field("title"))?,
            logo,
            items,
        })
    }
}

impl RawNavItem {
    fn resolve(self, path: &FieldPath) -> Result<NavItem, SchemaError> {
        let label = required_string(self.label, &path.field("label"))?;
        let position = parse_choice(
            self.position.as_deref(),
            &path.field("position"),
            Position::Left,
        )?;
        let kind = parse_choice(self.kind.as_deref(), &path.field("type"), NavKind::Default)?;

        let target = match kind {
            NavKind::DocSidebar => {
                for (value, field) in [(&self.to, "to"), (&self.href, "href")] {
                    if value.is_some() {
                        return Err(SchemaError::new(
                            path.field(field),
                            "not allowed on docSidebar items",
                        ));
                    }
                }
                NavTarget::SidebarLink {
                    sidebar_id: required_string(self.sidebar_id, &path.field("sidebarId"))?,
                    docs_plugin_id: optional_string(
                        self.docs_plugin_id,
                        &path.field("docsPluginId"),
                    )?,
                }
            }
            NavKind::Default => {
                let sidebar_fields = [
                    (&self.sidebar_id, "sidebarId"),
                    (&self.docs_plugin_id, "docsPluginId"),
                ];
                for (value, field) in sidebar_fields {
                    if value.is_some() {
                        return Err(SchemaError::new(
                            path.field(field),
                            "only allowed on docSidebar items",
                        ));
                    }
                }
                match resolve_link(self.to, self.href, path)? {
                    LinkTarget::Internal { to } => NavTarget::PageLink { to },
                    LinkTarget::External { href } => NavTarget::ExternalLink { href },
                }
            }
        };

        Ok(NavItem {
            label,
            position,
            target,
        })
    }
}

impl RawFooter {
    fn resolve(self, path: &FieldPath) -> Result<Footer, SchemaError> {
        let style = parse_choice(
            self.style.as_deref(),
            &path.field("style"),
            FooterStyle::Light,
        )?;

        let links_path = path.field("links");
        let links = self
            .links
            .into_iter()
            .enumerate()
            .map(|(i, column)| column.resolve(&links_path.index(i)))
            .collect::<Result<_, _>>()?;

        Ok(Footer {
            style,
            links,
            copyright: self.copyright,
        })
    }
}

impl RawFooterColumn {
    fn resolve(self, path: &FieldPath) -> Result<FooterColumn, SchemaError> {
        let title = required_string(self.title, &path.field("title"))?;
        let items_path = path.field("items");
        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(i, link)| {
                let path = items_path.index(i);
                Ok::<_, SchemaError>(FooterLink {
                    label: required_string(link.label, &path.field("label"))?,
                    target: resolve_link(link.to, link.href, &path)?,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(FooterColumn { title, items })
    }
}

impl RawCodeHighlighting {
    fn resolve(self, path: &FieldPath) -> Result<CodeHighlighting, SchemaError> {
        let theme = optional_string(self.theme, &path.field("theme"))?
            .unwrap_or_else(|| DEFAULT_LIGHT_THEME.to_owned());
        let dark_theme = optional_string(self.dark_theme, &path.field("darkTheme"))?
            .unwrap_or_else(|| DEFAULT_DARK_THEME.to_owned());

        let languages_path = path.field("additionalLanguages");
        for (i, language) in self.additional_languages.iter().enumerate() {
            let path = languages_path.index(i);
            require_non_empty(language, &path)?;
            if language.chars().any(char::is_whitespace) {
                return Err(SchemaError::new(path, "language name cannot contain whitespace"));
            }
        }
        require_unique(
            self.additional_languages.iter().map(String::as_str),
            &languages_path,
        )?;

        Ok(CodeHighlighting {
            theme,
            dark_theme,
            additional_languages: self.additional_languages,
        })
    }
}

/// Resolve a `to`/`href` pair; exactly one must be set.
fn resolve_link(
    to: Option<String>,
    href: Option<String>,
    path: &FieldPath,
) -> Result<LinkTarget, SchemaError> {
    match (to, href) {
        (Some(to), None) => {
            let to_path = path.field("to");
            require_non_empty(&to, &to_path)?;
            if !to.starts_with('/') {
                return Err(SchemaError::new(to_path, "internal path must start with /"));
            }
            Ok(LinkTarget::Internal { to })
        }
        (None, Some(href)) => {
            let href_path = path.field("href");
            if !href.starts_with("mailto:") {
                require_http_url(&href, &href_path)?;
            }
            Ok(LinkTarget::External { href })
        }
        (Some(_), Some(_)) => Err(SchemaError::new(
            path.clone(),
            "set either `to` or `href`, not both",
        )),
        (None, None) => Err(SchemaError::new(
            path.clone(),
            "link needs a target: set `to` or `href`",
        )),
    }
}
