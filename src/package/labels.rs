//! Derive a package configuration from container image labels.
//!
//! Images declare their package configuration through labels prefixed with
//! `io.hoist.`; each label value is a YAML document decoded into the matching
//! field.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;

use super::inspect::ImageMetadata;
use super::{PackageConfig, PackageError};

/// Prefix shared by every configuration label.
pub const LABEL_PREFIX: &str = "io.hoist.";

/// Label selecting how volumes with a missing host path are handled.
const MISSING_VOLUMES_LABEL: &str = "config.missing_volumes";

/// What: Problem found while decoding or linting image labels.
///
/// Inputs: Produced by [`package_from_labels`] and [`lint_labels`].
///
/// Output: Implements `Display`/`Error`; [`LabelError::is_strict`] tells whether
/// the problem should block an install.
///
/// Details:
/// - Unknown labels are tolerated unless the caller asks for strict checking.
#[derive(Debug)]
pub enum LabelError {
    /// Label value is not valid YAML for the target field.
    Decode {
        /// Full label name.
        label: String,
        /// Raw label value.
        value: String,
        /// Underlying YAML error.
        source: serde_norway::Error,
    },
    /// Label carries the prefix but names no known field.
    Unknown {
        /// Full label name.
        label: String,
    },
    /// `missing_volumes` strategy is not one of error, skip or mount.
    MissingVolumes {
        /// Offending value.
        value: String,
    },
    /// Image declares no entrypoint.
    NoEntrypoint,
}

impl LabelError {
    /// Whether this problem must abort an install even in lenient mode.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        !matches!(self, Self::Unknown { .. })
    }
}

impl fmt::Display for LabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode {
                label,
                value,
                source,
            } => write!(f, "decoding label {label}: failed to decode value {value}: {source}"),
            Self::Unknown { label } => write!(f, "unknown label {label}"),
            Self::MissingVolumes { value } => write!(
                f,
                "unexpected {LABEL_PREFIX}{MISSING_VOLUMES_LABEL} value: {value} expecting error, skip or mount"
            ),
            Self::NoEntrypoint => write!(
                f,
                "missing entrypoint in image. consider re-building using ENTRYPOINT [\"/path/to/your/binary\"]"
            ),
        }
    }
}

impl std::error::Error for LabelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode { source, .. } => Some(source),
            Self::Unknown { .. } | Self::MissingVolumes { .. } | Self::NoEntrypoint => None,
        }
    }
}

/// What: Decode a YAML label value into a typed field.
///
/// Inputs:
/// - `label`: Unprefixed label name, used for error reporting.
/// - `value`: Raw label text.
///
/// Output:
/// - Decoded value or a `LabelError::Decode`.
fn decode<T: DeserializeOwned>(label: &str, value: &str) -> Result<T, LabelError> {
    serde_norway::from_str(value).map_err(|source| LabelError::Decode {
        label: format!("{LABEL_PREFIX}{label}"),
        value: value.to_string(),
        source,
    })
}

/// What: Decode a plain string label.
///
/// Details:
/// - Version ranges such as `>=1.0 <2` are not always valid YAML strings;
///   the raw text is used whenever decoding fails.
fn decode_text(value: &str) -> String {
    serde_norway::from_str::<String>(value).unwrap_or_else(|_| value.to_string())
}

/// What: Store one unprefixed label into the matching package field.
///
/// Inputs:
/// - `pkg`: Package being built.
/// - `label`: Label name without the prefix.
/// - `value`: Raw label value.
///
/// Output:
/// - `Ok(true)` when the label names a field, `Ok(false)` when it is unknown.
///
/// # Errors
/// - Returns `Err(LabelError::Decode)` when the value does not fit the field type
fn apply_label(pkg: &mut PackageConfig, label: &str, value: &str) -> Result<bool, LabelError> {
    match label {
        "name" => pkg.name = decode_text(value),
        "config.environment" => pkg.environment = decode(label, value)?,
        "config.volumes" => pkg.volumes = decode(label, value)?,
        "config.ports" => pkg.ports = decode(label, value)?,
        "config.networks" => pkg.networks = decode(label, value)?,
        "config.working_dir" => pkg.working_dir = decode_text(value),
        "config.keep_container_user" => pkg.keep_container_user = decode(label, value)?,
        "required_version" => pkg.required_version = decode_text(value),
        "config.volumes_from_args" => pkg.path_arguments = decode(label, value)?,
        _ => return Ok(false),
    }
    Ok(true)
}

/// What: Derive the default package name from an image reference.
///
/// Inputs:
/// - `image`: Reference such as `registry.io/org/tool:1.2`.
///
/// Output:
/// - Last path segment without its tag (`tool`).
#[must_use]
pub fn name_from_image(image: &str) -> String {
    let last = image.rsplit('/').next().unwrap_or(image);
    last.split(':').next().unwrap_or(last).to_string()
}

/// What: Build a package configuration from an image's labels.
///
/// Inputs:
/// - `image`: Image reference the labels belong to.
/// - `labels`: All labels of the image.
///
/// Output:
/// - Package configuration; fields without a label keep their zero value.
///
/// # Errors
/// - Returns `Err(PackageError::Label)` when a known label cannot be decoded or
///   the missing-volumes strategy is invalid
/// - Returns `Err(PackageError::IncompatibleVersion)` when the image requires
///   a version range this build does not satisfy
///
/// Details:
/// - Labels without the prefix and unknown prefixed labels are ignored here;
///   use [`lint_labels`] to surface them.
/// - Leading dashes are stripped from path arguments.
pub fn package_from_labels(
    image: &str,
    labels: &HashMap<String, String>,
) -> Result<PackageConfig, PackageError> {
    let mut pkg = PackageConfig {
        name: name_from_image(image),
        image: image.to_string(),
        ..Default::default()
    };

    let mut missing_volumes = String::new();
    for (full_label, value) in labels {
        let Some(label) = full_label.strip_prefix(LABEL_PREFIX) else {
            continue;
        };
        if label == MISSING_VOLUMES_LABEL {
            missing_volumes = decode_text(value);
        } else if !apply_label(&mut pkg, label, value)? {
            tracing::debug!(label = %full_label, "ignoring unknown label");
        }
    }

    for arg in &mut pkg.path_arguments {
        *arg = arg.trim_start_matches('-').to_string();
    }

    match missing_volumes.as_str() {
        "" | "error" => {}
        "skip" => pkg.skip_missing_volumes = true,
        "mount" => pkg.mount_missing_volumes = true,
        _ => {
            return Err(LabelError::MissingVolumes {
                value: missing_volumes,
            }
            .into());
        }
    }

    super::version::check_compatible(&pkg.required_version)?;
    Ok(pkg)
}

/// What: Report every problem in an image's package labels.
///
/// Inputs:
/// - `metadata`: Image labels and entrypoint.
/// - `report`: Callback receiving each problem.
///
/// Output:
/// - None; problems are delivered through `report`.
///
/// Details:
/// - Labels are visited in sorted order so reports are stable.
pub fn lint_labels(metadata: &ImageMetadata, mut report: impl FnMut(LabelError)) {
    if metadata.entrypoint.is_empty() {
        report(LabelError::NoEntrypoint);
    }
    let mut labels: Vec<(&String, &String)> = metadata.labels.iter().collect();
    labels.sort();
    let mut scratch = PackageConfig::default();
    for (full_label, value) in labels {
        let Some(label) = full_label.strip_prefix(LABEL_PREFIX) else {
            continue;
        };
        if label == MISSING_VOLUMES_LABEL {
            if !matches!(value.as_str(), "" | "error" | "skip" | "mount") {
                report(LabelError::MissingVolumes {
                    value: value.clone(),
                });
            }
            continue;
        }
        match apply_label(&mut scratch, label, value) {
            Ok(true) => {}
            Ok(false) => report(LabelError::Unknown {
                label: full_label.clone(),
            }),
            Err(err) => report(err),
        }
    }
}
