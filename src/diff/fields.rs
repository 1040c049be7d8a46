//! Static field table of [`PackageConfig`].
//!
//! Each entry pairs a display name with an accessor so the diff walk can visit
//! every field in declaration order without reflection.

use crate::package::PackageConfig;

/// Declared type of a package field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// String scalar; empty is the zero value.
    Text,
    /// Boolean scalar; `false` is the zero value.
    Flag,
    /// Ordered list of strings.
    List,
}

impl FieldKind {
    /// Whether values of this kind are ordered lists.
    #[must_use]
    pub const fn is_list(self) -> bool {
        matches!(self, Self::List)
    }
}

/// Borrowed view of one field of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// String scalar.
    Text(&'a str),
    /// Boolean scalar.
    Flag(bool),
    /// Ordered list.
    List(&'a [String]),
}

impl FieldValue<'_> {
    /// Kind of the viewed value.
    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Flag(_) => FieldKind::Flag,
            Self::List(_) => FieldKind::List,
        }
    }
}

/// What: One entry of the field table.
///
/// Details:
/// - `name` is the label used in reports (`Environment`, `WorkingDir`, ...).
#[derive(Clone, Copy)]
pub struct FieldSpec {
    /// Name shown in reports.
    pub name: &'static str,
    /// Declared kind of the field.
    pub kind: FieldKind,
    /// Accessor returning a borrowed view of the field.
    pub value: for<'a> fn(&'a PackageConfig) -> FieldValue<'a>,
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Package name.
pub const NAME: FieldSpec = FieldSpec {
    name: "Name",
    kind: FieldKind::Text,
    value: |p| FieldValue::Text(&p.name),
};
/// Entrypoint override.
pub const ENTRYPOINT: FieldSpec = FieldSpec {
    name: "Entrypoint",
    kind: FieldKind::List,
    value: |p| FieldValue::List(&p.entrypoint),
};
/// Forwarded environment variables.
pub const ENVIRONMENT: FieldSpec = FieldSpec {
    name: "Environment",
    kind: FieldKind::List,
    value: |p| FieldValue::List(&p.environment),
};
/// Source image.
pub const IMAGE: FieldSpec = FieldSpec {
    name: "Image",
    kind: FieldKind::Text,
    value: |p| FieldValue::Text(&p.image),
};
/// Mounts.
pub const VOLUMES: FieldSpec = FieldSpec {
    name: "Volumes",
    kind: FieldKind::List,
    value: |p| FieldValue::List(&p.volumes),
};
/// Published ports.
pub const PORTS: FieldSpec = FieldSpec {
    name: "Ports",
    kind: FieldKind::List,
    value: |p| FieldValue::List(&p.ports),
};
/// Joined networks.
pub const NETWORKS: FieldSpec = FieldSpec {
    name: "Networks",
    kind: FieldKind::List,
    value: |p| FieldValue::List(&p.networks),
};
/// Container working directory.
pub const WORKING_DIR: FieldSpec = FieldSpec {
    name: "WorkingDir",
    kind: FieldKind::Text,
    value: |p| FieldValue::Text(&p.working_dir),
};
/// Keep the image user.
pub const KEEP_CONTAINER_USER: FieldSpec = FieldSpec {
    name: "KeepContainerUser",
    kind: FieldKind::Flag,
    value: |p| FieldValue::Flag(p.keep_container_user),
};
/// Skip volumes with a missing host path.
pub const SKIP_MISSING_VOLUMES: FieldSpec = FieldSpec {
    name: "SkipMissingVolumes",
    kind: FieldKind::Flag,
    value: |p| FieldValue::Flag(p.skip_missing_volumes),
};
/// Create volumes with a missing host path.
pub const MOUNT_MISSING_VOLUMES: FieldSpec = FieldSpec {
    name: "MountMissingVolumes",
    kind: FieldKind::Flag,
    value: |p| FieldValue::Flag(p.mount_missing_volumes),
};
/// Required tool version range.
pub const REQUIRED_VERSION: FieldSpec = FieldSpec {
    name: "RequiredVersion",
    kind: FieldKind::Text,
    value: |p| FieldValue::Text(&p.required_version),
};
/// Flags carrying host paths.
pub const PATH_ARGUMENTS: FieldSpec = FieldSpec {
    name: "PathArguments",
    kind: FieldKind::List,
    value: |p| FieldValue::List(&p.path_arguments),
};

/// Every field in declaration order.
pub static FIELDS: [FieldSpec; 13] = [
    NAME,
    ENTRYPOINT,
    ENVIRONMENT,
    IMAGE,
    VOLUMES,
    PORTS,
    NETWORKS,
    WORKING_DIR,
    KEEP_CONTAINER_USER,
    SKIP_MISSING_VOLUMES,
    MOUNT_MISSING_VOLUMES,
    REQUIRED_VERSION,
    PATH_ARGUMENTS,
];

/// What: Look up a field by its report name.
///
/// Inputs:
/// - `name`: Field name such as `Ports`.
///
/// Output:
/// - Matching entry, or `None` for an unknown name.
#[must_use]
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}
