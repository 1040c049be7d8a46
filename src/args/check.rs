//! `hoist check`: compare an installed package with its image labels.

use crate::config::Config;
use crate::package::inspect::{EngineInspector, ImageInspector};
use crate::package::{PackageConfig, load_package_from_path};

/// What: Handle `hoist check <PACKAGE>`.
///
/// Inputs:
/// - `config`: Effective configuration (install path and container engine).
/// - `package`: Installed package name or path to a package file.
///
/// Output:
/// - Diff between the installed file and what the image declares now.
///
/// # Errors
/// - Returns `Err` when the package cannot be loaded, the engine is missing,
///   or the image cannot be inspected
pub fn handle_check(config: &Config, package: &str) -> super::HandlerResult {
    let path = super::utils::resolve_package_path(&config.install_path, package);
    let installed = load_package_from_path(&path)?;
    let inspector = EngineInspector::locate(&config.container_engine)?;
    check_package(&installed, &inspector)
}

/// What: Render the outcome of comparing `installed` with its image.
///
/// Inputs:
/// - `installed`: Loaded package.
/// - `inspector`: Source of image metadata.
///
/// Output:
/// - Up-to-date notice, or the diff prefixed with a summary line.
///
/// # Errors
/// - Returns `Err` when the image cannot be inspected or its labels decoded
pub fn check_package<I: ImageInspector + ?Sized>(
    installed: &PackageConfig,
    inspector: &I,
) -> super::HandlerResult {
    let (changed, report) = installed.has_changes(inspector)?;
    tracing::info!(package = %installed.name, image = %installed.image, changed, "checked package");
    if !changed {
        return Ok(format!("{} is up to date with {}\n", installed.name, installed.image));
    }
    Ok(format!(
        "{} differs from the configuration declared by {}:\n\n{report}",
        installed.name, installed.image
    ))
}
