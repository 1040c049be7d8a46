//! Installed packages compared with the labels of their image.

use std::collections::HashMap;

use hoist::package::inspect::{ImageInspector, ImageMetadata, InspectError};
use hoist::package::labels::LABEL_PREFIX;
use hoist::package::{LabelError, PackageConfig, PackageError, lint_labels, package_from_labels};

/// Inspector returning fixed metadata for any image.
struct FixedInspector {
    metadata: ImageMetadata,
}

impl ImageInspector for FixedInspector {
    fn inspect(&self, _image: &str) -> Result<ImageMetadata, InspectError> {
        Ok(self.metadata.clone())
    }
}

fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (format!("{LABEL_PREFIX}{k}"), (*v).to_string()))
        .collect()
}

#[test]
/// What: Image labels that now request a port show up as a change
///
/// - Input: Installed package without ports; image labels declare one
/// - Output: `has_changes` reports the added port
fn image_adds_port() {
    let installed = PackageConfig {
        name: "web".into(),
        image: "nginx".into(),
        working_dir: "/workdir".into(),
        ..Default::default()
    };
    let inspector = FixedInspector {
        metadata: ImageMetadata {
            labels: labels(&[("config.ports", "[\"8080:80\"]")]),
            entrypoint: vec!["nginx".into()],
        },
    };
    let (changed, report) = installed.has_changes(&inspector).expect("inspect");
    assert!(changed);
    assert_eq!(report, "Added these values to Ports\n+ 8080:80\n");
}

#[test]
/// What: Invalid label values surface as strict errors
///
/// - Input: Non-list ports label, bad missing-volumes strategy, unknown label
/// - Output: Decode error from derivation, lint reports all three with the unknown one lenient
fn invalid_labels() {
    let bad = labels(&[
        ("config.ports", "{not: a list}"),
        ("config.missing_volumes", "explode"),
        ("config.colour", "blue"),
    ]);
    assert!(matches!(
        package_from_labels("img", &bad),
        Err(PackageError::Label(_))
    ));

    let metadata = ImageMetadata {
        labels: bad,
        entrypoint: vec!["tool".into()],
    };
    let mut problems = Vec::new();
    lint_labels(&metadata, |err| problems.push(err));
    assert_eq!(problems.len(), 3);
    assert_eq!(problems.iter().filter(|e| e.is_strict()).count(), 2);
    assert!(problems
        .iter()
        .any(|e| matches!(e, LabelError::Unknown { label } if label.ends_with("config.colour"))));
}
