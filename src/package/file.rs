//! Package file reading and writing.
//!
//! Package files are executable YAML documents whose first line is a shebang
//! pointing back at this tool, so the shell runs them through `hoist run`.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::{DEFAULT_WORKING_DIR, PackageConfig, PackageError};

/// Interpreter line written at the top of every package file.
pub const SHEBANG: &str = "#!/usr/bin/env hoist";

/// What: Load a package file from disk.
///
/// Inputs:
/// - `path`: Path to the package file.
///
/// Output:
/// - Parsed `PackageConfig` named after the file.
///
/// # Errors
/// - Returns `Err(PackageError::Io)` when the file cannot be read
/// - Returns `Err(PackageError::Yaml)` when the content is not a valid package document
/// - Returns `Err(PackageError::IncompatibleVersion)` when `required_version` excludes this build
///
/// Details:
/// - The shebang line is a YAML comment and needs no special handling.
/// - `working_dir` defaults to `/workdir` when absent.
pub fn load_package_from_path(path: &Path) -> Result<PackageConfig, PackageError> {
    let contents = fs::read_to_string(path)?;
    let mut pkg: PackageConfig = serde_norway::from_str(&contents)?;
    super::version::check_compatible(&pkg.required_version)?;
    pkg.name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if pkg.working_dir.is_empty() {
        pkg.working_dir = DEFAULT_WORKING_DIR.to_string();
    }
    tracing::debug!(path = %path.display(), name = %pkg.name, "loaded package file");
    Ok(pkg)
}

/// What: Serialize a package into the on-disk file format.
///
/// Inputs:
/// - `pkg`: Package to render.
///
/// Output:
/// - Shebang line followed by the YAML body.
///
/// # Errors
/// - Returns `Err(PackageError::Yaml)` when serialization fails
pub fn render_package(pkg: &PackageConfig) -> Result<String, PackageError> {
    let body = serde_norway::to_string(pkg)?;
    Ok(format!("{SHEBANG}\n{body}"))
}

/// What: Write a package file into an install directory.
///
/// Inputs:
/// - `dir`: Install directory.
/// - `pkg`: Package to write; its `name` becomes the file name.
/// - `force`: Replace an existing file with the same name.
///
/// Output:
/// - Path of the written file.
///
/// # Errors
/// - Returns `Err(PackageError::AlreadyExists)` when the file exists and `force` is false
/// - Returns `Err(PackageError::Io)` when writing or setting permissions fails
/// - Returns `Err(PackageError::Yaml)` when serialization fails
///
/// Details:
/// - On unix the file is made executable (`0755`).
pub fn write_package(dir: &Path, pkg: &PackageConfig, force: bool) -> Result<PathBuf, PackageError> {
    let path = dir.join(&pkg.name);
    if !force && path.exists() {
        return Err(PackageError::AlreadyExists(path));
    }
    fs::write(&path, render_package(pkg)?)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }
    tracing::info!(path = %path.display(), force, "wrote package file");
    Ok(path)
}

/// What: Check whether a path is a package file.
///
/// Inputs:
/// - `path`: Candidate file.
///
/// Output:
/// - `Ok(true)` for a regular file starting with the package shebang.
///
/// # Errors
/// - Returns `Err` when the file cannot be opened or read
///
/// Details:
/// - Directories and empty files are not packages.
pub fn is_package(path: &Path) -> std::io::Result<bool> {
    let file = fs::File::open(path)?;
    if file.metadata()?.is_dir() {
        return Ok(false);
    }
    let mut first_line = String::new();
    BufReader::new(file).read_line(&mut first_line)?;
    Ok(first_line.starts_with(SHEBANG))
}

/// What: Load every package installed in a directory.
///
/// Inputs:
/// - `dir`: Install directory.
///
/// Output:
/// - Map of package name to configuration, sorted by name.
///
/// # Errors
/// - Returns `Err(PackageError::Io)` when the directory cannot be listed or a file check fails
/// - Returns `Err(PackageError::Yaml)` when a package file is malformed
///
/// Details:
/// - Entries that cannot be opened because of permissions or dangling symlinks are skipped.
pub fn list_packages(dir: &Path) -> Result<BTreeMap<String, PackageConfig>, PackageError> {
    let mut packages = BTreeMap::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        match is_package(&path) {
            Ok(true) => {
                let pkg = load_package_from_path(&path)?;
                packages.insert(pkg.name.clone(), pkg);
            }
            Ok(false) => {}
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::NotFound
                ) =>
            {
                tracing::debug!(path = %path.display(), error = %err, "skipping unreadable entry");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Writing then loading a package keeps its configuration
    ///
    /// - Input: Package with ports, volumes and a custom working dir
    /// - Output: Loaded package equals the written one and is detected as a package
    fn write_then_load_package() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pkg = PackageConfig {
            name: "whalesay".to_string(),
            image: "docker/whalesay".to_string(),
            ports: vec!["80:80".to_string()],
            volumes: vec!["/tmp:/tmp:ro".to_string()],
            working_dir: "/src".to_string(),
            ..Default::default()
        };
        let path = write_package(dir.path(), &pkg, false).expect("write");
        assert!(is_package(&path).expect("is_package"));
        let loaded = load_package_from_path(&path).expect("load");
        assert_eq!(loaded, pkg);
    }

    #[test]
    /// What: Writing refuses to clobber an existing package unless forced
    ///
    /// - Input: Same package written twice
    /// - Output: Second plain write fails, forced write succeeds
    fn write_package_refuses_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pkg = PackageConfig {
            name: "tool".to_string(),
            image: "acme/tool".to_string(),
            ..Default::default()
        };
        write_package(dir.path(), &pkg, false).expect("first write");
        assert!(matches!(
            write_package(dir.path(), &pkg, false),
            Err(PackageError::AlreadyExists(_))
        ));
        assert!(write_package(dir.path(), &pkg, true).is_ok());
    }

    #[test]
    /// What: Loading applies the default working directory
    ///
    /// - Input: File without `working_dir`
    /// - Output: `working_dir` is `/workdir`
    fn load_defaults_working_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("jq");
        fs::write(&path, format!("{SHEBANG}\nimage: stedolan/jq\n")).expect("write");
        let pkg = load_package_from_path(&path).expect("load");
        assert_eq!(pkg.name, "jq");
        assert_eq!(pkg.working_dir, DEFAULT_WORKING_DIR);
    }

    #[test]
    /// What: Loading checks the required version against this build
    ///
    /// - Input: One file requiring `>=99.0.0`, one requiring the running version or newer
    /// - Output: The first is rejected, the second loads
    fn load_checks_required_version() {
        let dir = tempfile::tempdir().expect("tempdir");
        let future = dir.path().join("future");
        fs::write(&future, format!("{SHEBANG}\nimage: tool\nrequired_version: \">=99.0.0\"\n"))
            .expect("write");
        assert!(matches!(
            load_package_from_path(&future),
            Err(PackageError::IncompatibleVersion { .. })
        ));

        let current = dir.path().join("current");
        fs::write(
            &current,
            format!(
                "{SHEBANG}\nimage: tool\nrequired_version: \">={}\"\n",
                crate::package::version::CURRENT_VERSION
            ),
        )
        .expect("write");
        assert!(load_package_from_path(&current).is_ok());
    }

    #[test]
    /// What: Listing only returns shebang-tagged files
    ///
    /// - Input: One package file, one plain script, one directory
    /// - Output: Only the package is listed
    fn list_skips_non_packages() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("jq"), format!("{SHEBANG}\nimage: stedolan/jq\n"))
            .expect("write package");
        fs::write(dir.path().join("script"), "#!/bin/sh\necho hi\n").expect("write script");
        fs::create_dir(dir.path().join("nested")).expect("mkdir");
        let packages = list_packages(dir.path()).expect("list");
        assert_eq!(packages.keys().collect::<Vec<_>>(), vec!["jq"]);
    }
}
