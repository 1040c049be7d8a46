//! Field walk, change accumulation and the full diff report.

use std::fmt;
use std::fmt::Write;

use super::change::{StructChange, classify};
use super::fields::{FIELDS, FieldSpec};
use super::format::FormatterRegistry;
use crate::package::PackageConfig;

/// What: Changes of one diff walk, grouped per field.
///
/// Details:
/// - Fields appear in the order they were first discovered; changes within a
///   field keep classification order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    entries: Vec<(&'static str, Vec<StructChange>)>,
}

impl ChangeSet {
    /// What: Walk the given fields of two packages and classify every difference.
    ///
    /// Inputs:
    /// - `old`: Previous configuration.
    /// - `new`: Candidate configuration.
    /// - `fields`: Fields to visit, in visiting order.
    ///
    /// Output:
    /// - Accumulated changes; empty when the visited fields are equal.
    pub fn collect<'f>(
        old: &PackageConfig,
        new: &PackageConfig,
        fields: impl IntoIterator<Item = &'f FieldSpec>,
    ) -> Self {
        let mut set = Self::default();
        for spec in fields {
            let changes = classify(spec, (spec.value)(old), (spec.value)(new));
            if !changes.is_empty() {
                tracing::trace!(field = spec.name, count = changes.len(), "field changed");
            }
            for change in changes {
                set.push(change);
            }
        }
        set
    }

    /// Append a change under its field.
    pub fn push(&mut self, change: StructChange) {
        let field = change.field();
        if let Some((_, changes)) = self.entries.iter_mut().find(|(name, _)| *name == field) {
            changes.push(change);
        } else {
            self.entries.push((field, vec![change]));
        }
    }

    /// Changes recorded for one field.
    #[must_use]
    pub fn get(&self, field: &str) -> &[StructChange] {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, changes)| changes.as_slice())
            .unwrap_or_default()
    }

    /// Fields with their changes, in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[StructChange])> + '_ {
        self.entries
            .iter()
            .map(|(name, changes)| (*name, changes.as_slice()))
    }

    /// Total number of changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, changes)| changes.len()).sum()
    }

    /// Whether no field changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Additions, removals and modifications rendered separately, joined at the end.
#[derive(Debug, Default)]
pub(super) struct Sections {
    pub(super) additions: String,
    pub(super) removals: String,
    pub(super) modifications: String,
}

impl Sections {
    /// Non-empty sections separated by a blank line.
    pub(super) fn join(self) -> String {
        [self.additions, self.removals, self.modifications]
            .into_iter()
            .filter(|section| !section.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// What: Full human-readable diff between two package configurations.
///
/// Inputs:
/// - Two configurations; every field is compared.
///
/// Output:
/// - `Display` renders the additions, removals and modifications sections.
///
/// Details:
/// - Equal configurations render as the empty string.
#[derive(Debug, Clone)]
pub struct DiffReport {
    changes: ChangeSet,
    rendered: String,
}

impl DiffReport {
    /// What: Diff two packages, rendering values as-is.
    ///
    /// Inputs:
    /// - `old`: Previous configuration.
    /// - `new`: Candidate configuration.
    ///
    /// Output:
    /// - Report over every field.
    #[must_use]
    pub fn new(old: &PackageConfig, new: &PackageConfig) -> Self {
        Self::with_formatters(old, new, &FormatterRegistry::generic())
    }

    /// What: Diff two packages with a custom renderer registry.
    ///
    /// Inputs:
    /// - `old`, `new`: Configurations to compare.
    /// - `formatters`: Renderers per field.
    ///
    /// Output:
    /// - Report over every field; fields the registry cannot render contribute no lines.
    #[must_use]
    pub fn with_formatters(
        old: &PackageConfig,
        new: &PackageConfig,
        formatters: &FormatterRegistry,
    ) -> Self {
        let changes = ChangeSet::collect(old, new, &FIELDS);
        let rendered = render(&changes, formatters);
        tracing::debug!(changes = changes.len(), "computed package diff");
        Self { changes, rendered }
    }

    /// Classified changes behind the report.
    #[must_use]
    pub const fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    /// Whether the report has nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Render every field; each field gets its own header per section.
fn render(changes: &ChangeSet, formatters: &FormatterRegistry) -> String {
    let mut sections = Sections::default();
    for (field, field_changes) in changes.iter() {
        let Some(formatter) = formatters.get(field) else {
            continue;
        };
        let mut wrote_header = [false; 3];
        for change in field_changes {
            let rewritten = formatters.rewrite(change);
            let change = rewritten.as_ref().unwrap_or(change);
            let lines = formatter(change);
            if lines.is_empty() {
                continue;
            }
            match change {
                StructChange::Addition { .. } => {
                    if !wrote_header[0] {
                        let _ = writeln!(sections.additions, "Added these values to {field}");
                        wrote_header[0] = true;
                    }
                    push_lines(&mut sections.additions, &lines);
                }
                StructChange::Removal { .. } => {
                    if !wrote_header[1] {
                        let _ = writeln!(sections.removals, "Removed these values from {field}");
                        wrote_header[1] = true;
                    }
                    push_lines(&mut sections.removals, &lines);
                }
                StructChange::Modification { kind, .. } => {
                    if kind.is_list() {
                        if !wrote_header[2] {
                            let _ = writeln!(
                                sections.modifications,
                                "Modified these items of {field}"
                            );
                            wrote_header[2] = true;
                        }
                    } else {
                        let _ = writeln!(sections.modifications, "Modified {field}");
                    }
                    push_lines(&mut sections.modifications, &lines);
                }
            }
        }
    }
    sections.join()
}

/// Append each line followed by a newline.
pub(super) fn push_lines(out: &mut String, lines: &[String]) {
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
}
