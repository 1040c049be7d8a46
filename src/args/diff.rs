//! `hoist diff`: full field-by-field comparison of two package files.

use std::path::Path;

use crate::diff::DiffReport;
use crate::package::load_package_from_path;

/// What: Handle `hoist diff <INSTALLED> <CANDIDATE>`.
///
/// Inputs:
/// - `installed`: Package file treated as the old side.
/// - `candidate`: Package file treated as the new side.
///
/// Output:
/// - Rendered diff, or a short notice when the files agree.
///
/// # Errors
/// - Returns `Err` when either file cannot be loaded as a package
pub fn handle_diff(installed: &Path, candidate: &Path) -> super::HandlerResult {
    let old = load_package_from_path(installed)?;
    let new = load_package_from_path(candidate)?;
    let report = DiffReport::new(&old, &new);
    tracing::info!(
        installed = %installed.display(),
        candidate = %candidate.display(),
        fields = report.changes().len(),
        "diffed package files"
    );
    if report.is_empty() {
        return Ok(format!("No differences between {} and {}\n", old.name, new.name));
    }
    Ok(report.to_string())
}
