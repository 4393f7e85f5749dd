//! Reporting severities for broken references and authoring lapses.

use serde::Serialize;

use crate::validate::Choice;

/// How the site generator reacts to a detected problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    /// Silently accept.
    Ignore,
    /// Log and continue.
    Warn,
    /// Abort the build.
    FailBuild,
}

impl Severity {
    /// Whether this severity aborts generation.
    #[must_use]
    pub fn is_fatal(self) -> bool {
        self == Self::FailBuild
    }
}

impl Choice for Severity {
    const VARIANTS: &'static [(&'static str, Self)] = &[
        ("ignore", Self::Ignore),
        ("warn", Self::Warn),
        ("fail-build", Self::FailBuild),
    ];
    const ALIASES: &'static [(&'static str, Self)] = &[("throw", Self::FailBuild)];
}
