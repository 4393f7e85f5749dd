//! `docsite dump` command implementation.

use std::path::PathBuf;

use clap::Args;
use docsite_config::Project;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the dump command.
#[derive(Args)]
pub(crate) struct DumpArgs {
    /// Path to configuration file (default: auto-discover docsite.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print single-line JSON.
    #[arg(long)]
    compact: bool,
}

impl DumpArgs {
    /// Execute the dump command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or stdout is closed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let project = Project::load(self.config.as_deref())?;
        let json = render(&project, self.compact)?;
        Output::new().data(&json)?;
        Ok(())
    }
}

fn render(project: &Project, compact: bool) -> Result<String, serde_json::Error> {
    if compact {
        serde_json::to_string(project)
    } else {
        serde_json::to_string_pretty(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsite_config::SiteConfig;

    fn project() -> Project {
        let site = SiteConfig::from_toml_str(
            "title = \"Docs\"\nurl = \"https://docs.example.com\"\nbaseUrl = \"/\"\n",
        )
        .unwrap();
        Project::from_parts(site, Vec::new()).unwrap()
    }

    #[test]
    fn test_render_compact_is_single_line() {
        let json = render(&project(), true).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"baseUrl\":\"/\""));
    }

    #[test]
    fn test_render_pretty_round_trips_to_same_value() {
        let pretty: serde_json::Value =
            serde_json::from_str(&render(&project(), false).unwrap()).unwrap();
        let compact: serde_json::Value =
            serde_json::from_str(&render(&project(), true).unwrap()).unwrap();
        assert_eq!(pretty, compact);
        assert_eq!(pretty["site"]["onBrokenLinks"], "fail-build");
    }
}
