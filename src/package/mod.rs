//! Package configuration model and the routines that load, derive and compare it.
//!
//! A package is a small YAML document prefixed with a shebang line. The same
//! record can be derived from the labels of a container image, which is how a
//! candidate configuration is obtained before install or update.

pub mod file;
pub mod inspect;
pub mod labels;
pub mod version;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diff::{DiffReport, PermissionChangeReport};
use inspect::{ImageInspector, InspectError};

pub use file::{is_package, list_packages, load_package_from_path, render_package, write_package};
pub use labels::{LabelError, lint_labels, package_from_labels};

/// Working directory used inside the container when a package does not set one.
pub const DEFAULT_WORKING_DIR: &str = "/workdir";

/// What: Declarative description of an installed (or installable) package.
///
/// Inputs:
/// - Deserialized from a package file or derived from image labels.
///
/// Output:
/// - Consumed by the diff engine and by the package file writer.
///
/// Details:
/// - `name` is never serialized; it comes from the file name or the image reference.
/// - List fields keep the order in which they were authored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct PackageConfig {
    /// Package name, identical to the wrapper file name.
    #[serde(skip)]
    pub name: String,
    /// Command and arguments overriding the image entrypoint.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entrypoint: Vec<String>,
    /// Host environment variables forwarded into the container.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<String>,
    /// Source image reference.
    #[serde(default)]
    pub image: String,
    /// Mounts in `hostPath[:containerPath[:ro]]` form.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    /// Published ports in `hostPort[:containerPort][:udp]` form.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    /// Networks the container joins.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,
    /// Working directory inside the container.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub working_dir: String,
    /// Run as the image user instead of the invoking user.
    #[serde(default, skip_serializing_if = "is_false")]
    pub keep_container_user: bool,
    /// Silently drop volumes whose host path does not exist.
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_missing_volumes: bool,
    /// Create volumes whose host path does not exist.
    #[serde(default, skip_serializing_if = "is_false")]
    pub mount_missing_volumes: bool,
    /// Version range of the tool required by this package.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub required_version: String,
    /// Flags whose values are host paths to be mounted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_arguments: Vec<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

impl PackageConfig {
    /// What: Build the permission report shown before installing this package.
    ///
    /// Inputs:
    /// - `installed`: Currently installed configuration, `None` for a fresh install.
    ///
    /// Output:
    /// - Multi-line message, or an empty string when nothing permission-relevant changes.
    ///
    /// Details:
    /// - A fresh install is compared against an empty baseline.
    #[must_use]
    pub fn preinstall_message(&self, installed: Option<&Self>) -> String {
        let report = match installed {
            None => PermissionChangeReport::fresh_install(self),
            Some(prev) => PermissionChangeReport::update(prev, self),
        };
        report.to_string()
    }

    /// What: Compare this installed package with the configuration its image now declares.
    ///
    /// Inputs:
    /// - `inspector`: Source of image metadata.
    ///
    /// Output:
    /// - `Ok((changed, report))` where `report` is the full diff text.
    ///
    /// # Errors
    /// - Returns `Err(PackageError::Inspect)` when the image cannot be inspected
    /// - Returns `Err(PackageError::Label)` when an image label cannot be decoded
    /// - Returns `Err(PackageError::IncompatibleVersion)` when the image requires a newer tool
    ///
    /// Details:
    /// - The installed file is the old side: additions mean the image now declares
    ///   more than the installed file.
    /// - The candidate gets the default working directory when its image does not set one,
    ///   matching what the package loader does for files.
    pub fn has_changes<I: ImageInspector + ?Sized>(
        &self,
        inspector: &I,
    ) -> Result<(bool, String), PackageError> {
        let metadata = inspector.inspect(&self.image)?;
        let mut candidate = package_from_labels(&self.image, &metadata.labels)?;
        if candidate.working_dir.is_empty() {
            candidate.working_dir = DEFAULT_WORKING_DIR.to_string();
        }
        // The candidate is named after the image; keep the installed name so renames are not noise.
        candidate.name.clone_from(&self.name);

        let report = DiffReport::new(self, &candidate);
        tracing::debug!(
            package = %self.name,
            image = %self.image,
            changed = !report.is_empty(),
            "compared installed package with image"
        );
        Ok((!report.is_empty(), report.to_string()))
    }
}

/// What: Errors raised while loading, writing or deriving a package.
///
/// Inputs: Generated by the file, label and inspection helpers.
///
/// Output: Implements `Display`/`Error` for propagation up to the CLI.
///
/// Details:
/// - Wraps I/O, YAML, label and inspection failures.
#[derive(Debug)]
pub enum PackageError {
    /// I/O error while reading or writing a package file.
    Io(std::io::Error),
    /// Package file content is not valid YAML for a package.
    Yaml(serde_norway::Error),
    /// A package file with the same name is already installed.
    AlreadyExists(std::path::PathBuf),
    /// A version or version range could not be parsed.
    InvalidVersion {
        /// Text that failed to parse.
        value: String,
        /// Underlying error.
        source: semver::Error,
    },
    /// The package requires a version range this build does not satisfy.
    IncompatibleVersion {
        /// Required range.
        required: String,
        /// Running version.
        current: String,
    },
    /// An image label could not be decoded.
    Label(LabelError),
    /// Image metadata could not be retrieved.
    Inspect(InspectError),
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Yaml(err) => write!(f, "invalid package file: {err}"),
            Self::AlreadyExists(path) => write!(f, "'{}' already exists", path.display()),
            Self::InvalidVersion { value, source } => {
                write!(f, "invalid version or range {value}: {source}")
            }
            Self::IncompatibleVersion { required, current } => write!(
                f,
                "current hoist version {current} is incompatible with range {required}"
            ),
            Self::Label(err) => write!(f, "{err}"),
            Self::Inspect(err) => write!(f, "image inspection failed: {err}"),
        }
    }
}

impl std::error::Error for PackageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Yaml(err) => Some(err),
            Self::Label(err) => Some(err),
            Self::Inspect(err) => Some(err),
            Self::InvalidVersion { source, .. } => Some(source),
            Self::AlreadyExists(_) | Self::IncompatibleVersion { .. } => None,
        }
    }
}

impl From<std::io::Error> for PackageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_norway::Error> for PackageError {
    fn from(value: serde_norway::Error) -> Self {
        Self::Yaml(value)
    }
}

impl From<LabelError> for PackageError {
    fn from(value: LabelError) -> Self {
        Self::Label(value)
    }
}

impl From<InspectError> for PackageError {
    fn from(value: InspectError) -> Self {
        Self::Inspect(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::inspect::ImageMetadata;
    use std::collections::HashMap;

    struct StaticInspector {
        labels: HashMap<String, String>,
    }

    impl ImageInspector for StaticInspector {
        fn inspect(&self, _image: &str) -> Result<ImageMetadata, InspectError> {
            Ok(ImageMetadata {
                labels: self.labels.clone(),
                entrypoint: vec!["/bin/tool".to_string()],
            })
        }
    }

    fn installed() -> PackageConfig {
        PackageConfig {
            name: "tool".to_string(),
            image: "acme/tool".to_string(),
            working_dir: DEFAULT_WORKING_DIR.to_string(),
            ..Default::default()
        }
    }

    #[test]
    /// What: A fresh install reports every requested permission
    ///
    /// - Input: Candidate with one environment variable, no installed package
    /// - Output: Fresh install header followed by the variable line
    fn preinstall_message_fresh_install() {
        let candidate = PackageConfig {
            environment: vec!["HOME".to_string()],
            ..installed()
        };
        assert_eq!(
            candidate.preinstall_message(None),
            "This package needs additional access to your system. It wants to:\n\n\
             * Read the environment variable HOME\n"
        );
    }

    #[test]
    /// What: Reinstalling an identical package yields no message
    ///
    /// - Input: Same configuration installed and candidate
    /// - Output: Empty string
    fn preinstall_message_unchanged_is_empty() {
        let pkg = installed();
        assert_eq!(pkg.preinstall_message(Some(&pkg)), "");
    }

    #[test]
    /// What: An image whose labels match the installed package reports no change
    ///
    /// - Input: No labels on the image, installed package with default working dir
    /// - Output: `(false, "")`
    fn has_changes_detects_identical_image() {
        let inspector = StaticInspector {
            labels: HashMap::new(),
        };
        let (changed, report) = installed()
            .has_changes(&inspector)
            .expect("inspection should succeed");
        assert!(!changed);
        assert_eq!(report, "");
    }

    #[test]
    /// What: A new port label on the image shows up in the full diff
    ///
    /// - Input: Image gains `io.hoist.config.ports: ["8080:80"]`
    /// - Output: Changed flag set, report lists the added port
    fn has_changes_reports_new_label() {
        let mut labels = HashMap::new();
        labels.insert(
            "io.hoist.config.ports".to_string(),
            "[\"8080:80\"]".to_string(),
        );
        let inspector = StaticInspector { labels };
        let (changed, report) = installed()
            .has_changes(&inspector)
            .expect("inspection should succeed");
        assert!(changed);
        assert_eq!(report, "Added these values to Ports\n+ 8080:80\n");
    }
}
