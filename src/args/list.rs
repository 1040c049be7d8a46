//! `hoist list`: installed packages in the configured install path.

use std::fmt::Write as _;

use crate::config::Config;
use crate::package::list_packages;

/// What: Handle `hoist list`.
///
/// Inputs:
/// - `config`: Effective configuration.
///
/// Output:
/// - One `name<TAB>image` line per installed package, sorted by name.
///
/// # Errors
/// - Returns `Err` when the install path cannot be read
///
/// Details:
/// - A missing install directory lists nothing rather than failing.
pub fn handle_list(config: &Config) -> super::HandlerResult {
    if !config.install_path.is_dir() {
        tracing::warn!(install_path = %config.install_path.display(), "install path does not exist");
        return Ok(String::new());
    }
    let packages = list_packages(&config.install_path)?;
    tracing::info!(
        install_path = %config.install_path.display(),
        count = packages.len(),
        "listed installed packages"
    );
    let mut out = String::new();
    for (name, pkg) in &packages {
        let _ = writeln!(out, "{name}\t{}", pkg.image);
    }
    Ok(out)
}
