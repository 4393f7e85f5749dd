//! Configuration schema for docsite.
//!
//! Parses the site-wide `docsite.toml` and the YAML sidebar files it
//! references into validated, immutable values. Every violation is reported
//! as a [`SchemaError`] naming the offending field:
//!
//! ```text
//! i18n.defaultLocale: "fr" is not one of the configured locales (en, de)
//! ```
//!
//! Use [`Project::load`] to discover `docsite.toml`, load the sidebars of every
//! docs plugin and check navbar sidebar links against them. [`SiteConfig`] and
//! [`SidebarConfig`] can also be loaded on their own.
//!
//! ```toml
//! title = "Tiger Grades"
//! url = "https://docs.example.com"
//! baseUrl = "/"
//!
//! [[plugins]]
//! kind = "docs"
//! sidebarPath = "sidebars.yaml"
//!
//! [[theme.navbar.items]]
//! type = "docSidebar"
//! sidebarId = "tutorialSidebar"
//! label = "Tutorial"
//! ```

mod expand;
mod validate;

pub mod error;
pub mod plugin;
pub mod policy;
pub mod project;
pub mod sidebar;
pub mod site;
pub mod theme;

pub use error::{ConfigError, FieldPath, SchemaError};
pub use plugin::{BlogPlugin, ContentPlugin, DocsPlugin, FeedOptions, FeedType};
pub use policy::Severity;
pub use project::Project;
pub use sidebar::{CategoryLink, Sidebar, SidebarConfig, SidebarNode};
pub use site::{CONFIG_FILENAME, I18n, SiteConfig};
pub use theme::{NavItem, NavTarget, Theme};
