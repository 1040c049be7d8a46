//! Reports built from package files written to disk.

use std::path::Path;

use hoist::diff::{DiffReport, FormatterRegistry, InstallMode, PermissionChangeReport};
use hoist::package::{PackageConfig, load_package_from_path, write_package};

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/usr/bin/env hoist\n{body}")).expect("write package");
    path
}

#[test]
/// What: Updating a package adds, removes and modifies permissions in one report
///
/// - Input: Installed and candidate files differing in environment, ports and volumes
/// - Output: Three sections in addition, removal, modification order
fn update_report_from_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let installed = write(
        dir.path(),
        "installed",
        "image: web:1\n\
         environment:\n  - TOKEN\n\
         ports:\n  - 8080:80\n\
         volumes:\n  - /srv/data:/data\n",
    );
    let candidate = write(
        dir.path(),
        "candidate",
        "image: web:2\n\
         environment:\n  - TOKEN\n  - REGION\n\
         volumes:\n  - /srv/data:/data:ro\n",
    );
    let old = load_package_from_path(&installed).expect("load installed");
    let new = load_package_from_path(&candidate).expect("load candidate");

    let report = PermissionChangeReport::update(&old, &new);
    assert_eq!(report.mode(), InstallMode::Update);
    assert_eq!(
        report.to_string(),
        "This package update requests additional permissions to the ones it currently has:\n\
         \n\
         * Read the environment variable REGION\n\
         \n\
         Updating this package will remove some of its current permissions:\n\
         \n\
         * Listen on TCP port 8080\n\
         \n\
         Updating this package will modify some of its current permissions\n\
         \n\
         * Read and write changed to read of the file or directory \"/srv/data\"\n"
    );
    assert_eq!(new.preinstall_message(Some(&old)), report.to_string());
}

#[test]
/// What: Full diff covers fields the permission report ignores
///
/// - Input: Same files as a permission-neutral update of image and working dir
/// - Output: Diff reports both, permission report is empty
fn diff_covers_non_permission_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let old = load_package_from_path(&write(dir.path(), "tool", "image: tool:1\n")).expect("load");
    let new = PackageConfig {
        image: "tool:2".into(),
        working_dir: "/src".into(),
        ..old.clone()
    };
    let diff = DiffReport::new(&old, &new);
    assert!(!diff.is_empty());
    assert_eq!(
        diff.to_string(),
        "Modified Image\n> tool:1 to tool:2\nModified WorkingDir\n> /workdir to /src\n"
    );
    assert_eq!(new.preinstall_message(Some(&old)), "");
}

#[test]
/// What: Semantic formatters describe permission fields in the full diff
///
/// - Input: A new port, with the semantic registry
/// - Output: Port described as a listen permission under the Ports header
fn semantic_full_diff() {
    let old = PackageConfig::default();
    let new = PackageConfig {
        ports: vec!["53:53/udp".into()],
        ..Default::default()
    };
    let report = DiffReport::with_formatters(&old, &new, &FormatterRegistry::semantic());
    assert_eq!(
        report.to_string(),
        "Added these values to Ports\n* Listen on UDP port 53\n"
    );
}

#[test]
/// What: A written package yields the same fresh install report after reload
///
/// - Input: Package with a variable and a read-only mount written with `write_package`
/// - Output: Reloaded package reports the same permissions
fn written_package_round_trips_through_reports() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pkg = PackageConfig {
        name: "kubectl".into(),
        image: "bitnami/kubectl".into(),
        environment: vec!["KUBECONFIG".into()],
        volumes: vec!["~/.kube:/root/.kube:ro".into()],
        working_dir: "/workdir".into(),
        ..Default::default()
    };
    let path = write_package(dir.path(), &pkg, false).expect("write");
    let loaded = load_package_from_path(&path).expect("load");
    let fresh = PermissionChangeReport::new(InstallMode::FreshInstall, &PackageConfig::default(), &loaded);
    assert_eq!(
        fresh.to_string(),
        "This package needs additional access to your system. It wants to:\n\
         \n\
         * Read the environment variable KUBECONFIG\n\
         * Read the file or directory \"~/.kube\"\n"
    );
    assert_eq!(fresh.to_string(), loaded.preinstall_message(None));
}
