//! `hoist permissions`: access a package requests on install or update.

use std::path::Path;

use crate::package::load_package_from_path;

/// What: Handle `hoist permissions <CANDIDATE> [--installed FILE]`.
///
/// Inputs:
/// - `candidate`: Package file about to be installed.
/// - `installed`: Currently installed package file, if this is an update.
///
/// Output:
/// - Permission report, or a short notice when no permission changes.
///
/// # Errors
/// - Returns `Err` when a file cannot be loaded as a package
pub fn handle_permissions(candidate: &Path, installed: Option<&Path>) -> super::HandlerResult {
    let new = load_package_from_path(candidate)?;
    let old = installed.map(load_package_from_path).transpose()?;
    let message = new.preinstall_message(old.as_ref());
    tracing::info!(
        package = %new.name,
        update = old.is_some(),
        changed = !message.is_empty(),
        "built permission report"
    );
    if message.is_empty() {
        return Ok(format!("{} requests no permission changes\n", new.name));
    }
    Ok(message)
}
