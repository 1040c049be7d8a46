//! Permission-only report shown before installing or updating a package.
//!
//! Only Environment, Ports and Volumes are compared, always in that order,
//! because they are the fields that grant a package access to the host.

use std::fmt;

use super::change::StructChange;
use super::fields::field;
use super::format::FormatterRegistry;
use super::report::{ChangeSet, Sections, push_lines};
use crate::package::PackageConfig;

const FRESH_INSTALL_HEADER: &str =
    "This package needs additional access to your system. It wants to:";
const UPDATE_ADDITIONS_HEADER: &str =
    "This package update requests additional permissions to the ones it currently has:";
const UPDATE_REMOVALS_HEADER: &str =
    "Updating this package will remove some of its current permissions:";
const UPDATE_MODIFICATIONS_HEADER: &str =
    "Updating this package will modify some of its current permissions";

/// How the report is framed to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    /// Nothing is installed yet; the baseline is an empty package.
    FreshInstall,
    /// An installed package is being replaced.
    Update,
}

/// What: Permission changes between an installed package and a candidate.
///
/// Inputs:
/// - Baseline (empty for a fresh install) and candidate configuration.
///
/// Output:
/// - `Display` renders the report; an empty string means nothing to confirm.
///
/// Details:
/// - Fields other than Environment, Ports and Volumes are never visited.
#[derive(Debug, Clone)]
pub struct PermissionChangeReport {
    mode: InstallMode,
    changes: ChangeSet,
    rendered: String,
}

impl PermissionChangeReport {
    /// What: Report what a fresh install will be allowed to do.
    ///
    /// Inputs:
    /// - `candidate`: Package about to be installed.
    ///
    /// Output:
    /// - Report comparing an empty package with the candidate.
    #[must_use]
    pub fn fresh_install(candidate: &PackageConfig) -> Self {
        Self::new(InstallMode::FreshInstall, &PackageConfig::default(), candidate)
    }

    /// What: Report how an update changes the permissions of an installed package.
    ///
    /// Inputs:
    /// - `installed`: Current configuration.
    /// - `candidate`: Replacement configuration.
    ///
    /// Output:
    /// - Report with added, removed and modified permissions.
    #[must_use]
    pub fn update(installed: &PackageConfig, candidate: &PackageConfig) -> Self {
        Self::new(InstallMode::Update, installed, candidate)
    }

    /// What: Build a report for an explicit mode and baseline.
    ///
    /// Inputs:
    /// - `mode`: Framing of the section headers.
    /// - `old`: Baseline configuration.
    /// - `new`: Candidate configuration.
    ///
    /// Output:
    /// - Rendered permission report.
    #[must_use]
    pub fn new(mode: InstallMode, old: &PackageConfig, new: &PackageConfig) -> Self {
        let formatters = FormatterRegistry::permissions();
        let changes = ChangeSet::collect(old, new, formatters.fields().filter_map(field));
        let rendered = render(mode, &changes, &formatters);
        tracing::debug!(
            ?mode,
            changes = changes.len(),
            "computed permission changes"
        );
        Self {
            mode,
            changes,
            rendered,
        }
    }

    /// Framing chosen at construction.
    #[must_use]
    pub const fn mode(&self) -> InstallMode {
        self.mode
    }

    /// Classified permission changes behind the report.
    #[must_use]
    pub const fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    /// Whether there is nothing to show (and nothing to confirm).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }
}

impl fmt::Display for PermissionChangeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Write `header` and a blank line the first time a section receives lines.
fn open_section(out: &mut String, header: &str) {
    if out.is_empty() {
        out.push_str(header);
        out.push_str("\n\n");
    }
}

/// Render permission fields in registry order; headers are shared across fields.
fn render(mode: InstallMode, changes: &ChangeSet, formatters: &FormatterRegistry) -> String {
    let additions_header = match mode {
        InstallMode::FreshInstall => FRESH_INSTALL_HEADER,
        InstallMode::Update => UPDATE_ADDITIONS_HEADER,
    };
    let mut sections = Sections::default();
    for name in formatters.fields() {
        let Some(formatter) = formatters.get(name) else {
            continue;
        };
        for change in changes.get(name) {
            let rewritten = formatters.rewrite(change);
            let change = rewritten.as_ref().unwrap_or(change);
            let lines = formatter(change);
            if lines.is_empty() {
                continue;
            }
            let (out, header) = match change {
                StructChange::Addition { .. } => (&mut sections.additions, additions_header),
                StructChange::Removal { .. } => (&mut sections.removals, UPDATE_REMOVALS_HEADER),
                StructChange::Modification { .. } => {
                    (&mut sections.modifications, UPDATE_MODIFICATIONS_HEADER)
                }
            };
            open_section(out, header);
            push_lines(out, &lines);
        }
    }
    sections.join()
}
