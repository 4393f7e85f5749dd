//! A site configuration together with the sidebars of its docs plugins.

use std::path::{Path, PathBuf};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{ConfigError, FieldPath, SchemaError};
use crate::plugin::DEFAULT_PLUGIN_ID;
use crate::sidebar::SidebarConfig;
use crate::site::{CONFIG_FILENAME, SiteConfig};

/// Fully loaded and cross-checked documentation project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    #[serde(skip)]
    config_path: Option<PathBuf>,
    site: SiteConfig,
    /// Sidebars keyed by docs plugin id, in plugin order.
    #[serde(serialize_with = "serialize_sidebars")]
    sidebars: Vec<(String, SidebarConfig)>,
}

impl Project {
    /// Load a project.
    ///
    /// With an explicit `config_path` the file must exist. Otherwise
    /// `docsite.toml` is searched for in the current directory and its parents.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` when no configuration file can be found,
    /// and any error from loading the site or sidebar files.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) => path.to_path_buf(),
            None => {
                let cwd = std::env::current_dir()?;
                SiteConfig::discover(&cwd)
                    .ok_or_else(|| ConfigError::NotFound(cwd.join(CONFIG_FILENAME)))?
            }
        };
        Self::load_from_file(&path)
    }

    /// Load a project from a specific `docsite.toml`.
    ///
    /// Sidebar paths are resolved relative to the configuration file's
    /// directory. Docs plugins without `sidebarPath` get
    /// [`SidebarConfig::autogenerated`].
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let site = SiteConfig::load_from_file(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));

        let mut sidebars = Vec::new();
        for docs in site.docs_plugins() {
            let config = match &docs.sidebar_path {
                Some(sidebar_path) => {
                    let file = config_dir.join(sidebar_path);
                    SidebarConfig::load_from_file(&file).map_err(|err| ConfigError::Sidebar {
                        file,
                        source: Box::new(err),
                    })?
                }
                None => SidebarConfig::autogenerated(),
            };
            sidebars.push((docs.id.clone(), config));
        }

        let mut project = Self::from_parts(site, sidebars)?;
        project.config_path = Some(path.to_path_buf());
        tracing::info!(
            path = %path.display(),
            docs_plugins = project.sidebars.len(),
            "Loaded project"
        );
        Ok(project)
    }

    /// Assemble a project from already-loaded values.
    ///
    /// Docs plugins missing from `sidebars_by_plugin` get the autogenerated
    /// sidebar. Navbar sidebar links are checked against the result.
    pub fn from_parts(
        site: SiteConfig,
        sidebars_by_plugin: Vec<(String, SidebarConfig)>,
    ) -> Result<Self, SchemaError> {
        let mut remaining = sidebars_by_plugin;
        let mut sidebars = Vec::with_capacity(remaining.len());
        for docs in site.docs_plugins() {
            let config = match remaining.iter().position(|(id, _)| *id == docs.id) {
                Some(index) => remaining.remove(index).1,
                None => SidebarConfig::autogenerated(),
            };
            sidebars.push((docs.id.clone(), config));
        }
        if let Some((id, _)) = remaining.first() {
            return Err(SchemaError::new(
                "plugins",
                format!("sidebars given for \"{id}\", which is not a docs plugin"),
            ));
        }

        let project = Self {
            config_path: None,
            site,
            sidebars,
        };
        project.check_navbar_links()?;
        Ok(project)
    }

    /// Every `docSidebar` navbar item must name a declared sidebar of an
    /// existing docs plugin.
    fn check_navbar_links(&self) -> Result<(), SchemaError> {
        let items_path = FieldPath::root()
            .field("theme")
            .field("navbar")
            .field("items");

        for (i, sidebar_id, plugin_id) in self.site.theme.navbar.sidebar_links() {
            let item_path = items_path.index(i);
            let plugin_id = plugin_id.unwrap_or(DEFAULT_PLUGIN_ID);
            let Some(sidebars) = self.sidebars(plugin_id) else {
                return Err(SchemaError::new(
                    item_path.field("docsPluginId"),
                    format!("no docs plugin with id \"{plugin_id}\""),
                ));
            };
            if !sidebars.contains(sidebar_id) {
                let declared: Vec<&str> = sidebars.ids().collect();
                return Err(SchemaError::new(
                    item_path.field("sidebarId"),
                    format!(
                        "sidebar \"{sidebar_id}\" is not declared by docs plugin \"{plugin_id}\" \
                         (declared: {})",
                        declared.join(", ")
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Path of the loaded `docsite.toml`, if loaded from disk.
    #[must_use]
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    #[must_use]
    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Sidebars of the docs plugin with the given id.
    #[must_use]
    pub fn sidebars(&self, plugin_id: &str) -> Option<&SidebarConfig> {
        self.sidebars
            .iter()
            .find(|(id, _)| id == plugin_id)
            .map(|(_, config)| config)
    }

    /// Docs plugin ids with their sidebars, in plugin order.
    pub fn sidebars_by_plugin(&self) -> impl Iterator<Item = (&str, &SidebarConfig)> {
        self.sidebars
            .iter()
            .map(|(id, config)| (id.as_str(), config))
    }
}

fn serialize_sidebars<S: Serializer>(
    sidebars: &[(String, SidebarConfig)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(sidebars.len()))?;
    for (id, config) in sidebars {
        map.serialize_entry(id, config)?;
    }
    map.end()
}
