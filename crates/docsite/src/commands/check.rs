//! `docsite check` command implementation.

use std::path::PathBuf;

use clap::Args;
use docsite_config::{ContentPlugin, Project, Severity, SiteConfig};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to configuration file (default: auto-discover docsite.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (show loaded files).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or any sidebar file is invalid.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let project = Project::load(self.config.as_deref())?;
        let site = project.site();

        if let Some(path) = project.config_path() {
            output.info(&format!("Config: {}", path.display()));
        }
        output.highlight(&format!("{} ({})", site.title, site.site_url()));
        for line in plugin_summary(&project) {
            output.info(&line);
        }
        for warning in lenient_policies(site) {
            output.warning(&warning);
        }
        output.success("Configuration is valid");

        Ok(())
    }
}

/// One line per content plugin.
fn plugin_summary(project: &Project) -> Vec<String> {
    project
        .site()
        .plugins
        .iter()
        .map(|plugin| match plugin {
            ContentPlugin::Docs(docs) => {
                let (sidebars, documents) = project
                    .sidebars(&docs.id)
                    .map(|config| {
                        let documents: usize = config.iter().map(|s| s.documents().len()).sum();
                        (config.len(), documents)
                    })
                    .unwrap_or_default();
                format!(
                    "Docs \"{}\" at /{}: {sidebars} sidebar(s), {documents} document(s)",
                    docs.id, docs.route_base_path
                )
            }
            ContentPlugin::Blog(blog) => {
                format!("Blog \"{}\" at /{}", blog.id, blog.route_base_path)
            }
        })
        .collect()
}

/// Reporting policies that let broken references through silently.
fn lenient_policies(site: &SiteConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut check = |field: String, severity: Severity| {
        if severity == Severity::Ignore {
            warnings.push(format!("{field} is \"ignore\": problems will not be reported"));
        }
    };

    check("onBrokenLinks".to_owned(), site.on_broken_links);
    check(
        "onBrokenMarkdownLinks".to_owned(),
        site.on_broken_markdown_links,
    );
    for (i, plugin) in site.plugins.iter().enumerate() {
        if let ContentPlugin::Blog(blog) = plugin {
            check(format!("plugins[{i}].onInlineTags"), blog.on_inline_tags);
            check(format!("plugins[{i}].onInlineAuthors"), blog.on_inline_authors);
            check(
                format!("plugins[{i}].onUntruncatedBlogPosts"),
                blog.on_untruncated_blog_posts,
            );
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SITE: &str = r#"
title = "Docs"
url = "https://docs.example.com"
baseUrl = "/"
onBrokenMarkdownLinks = "ignore"

[[plugins]]
kind = "docs"

[[plugins]]
kind = "blog"
routeBasePath = "news"
onInlineTags = "ignore"
onUntruncatedBlogPosts = "ignore"
"#;

    fn project() -> Project {
        let site = SiteConfig::from_toml_str(SITE).unwrap();
        Project::from_parts(site, Vec::new()).unwrap()
    }

    #[test]
    fn test_plugin_summary() {
        assert_eq!(
            plugin_summary(&project()),
            vec![
                "Docs \"default\" at /docs: 1 sidebar(s), 0 document(s)".to_owned(),
                "Blog \"default\" at /news".to_owned(),
            ]
        );
    }

    #[test]
    fn test_lenient_policies() {
        let warnings = lenient_policies(project().site());
        assert_eq!(
            warnings,
            vec![
                "onBrokenMarkdownLinks is \"ignore\": problems will not be reported".to_owned(),
                "plugins[1].onInlineTags is \"ignore\": problems will not be reported".to_owned(),
                "plugins[1].onUntruncatedBlogPosts is \"ignore\": problems will not be reported"
                    .to_owned(),
            ]
        );
    }

    #[test]
    fn test_execute_missing_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let args = CheckArgs {
            config: Some(temp_dir.path().join("docsite.toml")),
            verbose: false,
        };
        let err = args.execute().unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
