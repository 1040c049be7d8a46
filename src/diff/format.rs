//! Per-field renderers turning a classified change into report lines.
//!
//! The generic renderer prints raw values. Ports, environment variables and
//! volumes get renderers that describe the access being granted.

use std::fmt::Write;

use super::change::StructChange;
use super::fields::{ENVIRONMENT, PORTS, VOLUMES};

/// Renderer for one change; returns one line per reported item.
pub type Formatter = fn(&StructChange) -> Vec<String>;

/// Re-expresses a change before it is placed in a section; `None` keeps it.
pub type Rewrite = fn(&StructChange) -> Option<StructChange>;

/// What: Render a change as raw values.
///
/// Inputs:
/// - `change`: Any change.
///
/// Output:
/// - `+ value` / `- value` per item for additions and removals, `> old to new` for modifications.
#[must_use]
pub fn generic(change: &StructChange) -> Vec<String> {
    match change {
        StructChange::Addition { value, .. } => {
            value.items().iter().map(|v| format!("+ {v}")).collect()
        }
        StructChange::Removal { value, .. } => {
            value.items().iter().map(|v| format!("- {v}")).collect()
        }
        StructChange::Modification { old, new, .. } => vec![format!("> {old} to {new}")],
    }
}

/// Host port and protocol parsed from `hostPort[:containerPort][:udp]`.
struct PortSpec<'a> {
    host: &'a str,
    udp: bool,
}

impl<'a> PortSpec<'a> {
    fn parse(raw: &'a str) -> Self {
        Self {
            host: raw.split(':').next().unwrap_or(raw),
            udp: raw.rsplit([':', '/']).next() == Some("udp"),
        }
    }

    const fn protocol(&self) -> &'static str {
        if self.udp { "UDP" } else { "TCP" }
    }
}

/// What: Describe which host ports a package listens on.
///
/// Inputs:
/// - `change`: Change of the `Ports` field.
///
/// Output:
/// - `* Listen on <PROTO> port <PORT>` per added or removed port; modifications
///   spell out protocol and port changes.
///
/// Details:
/// - Port numbers are not validated; the text before the first `:` is echoed.
#[must_use]
pub fn ports(change: &StructChange) -> Vec<String> {
    match change {
        StructChange::Addition { value, .. } | StructChange::Removal { value, .. } => value
            .items()
            .iter()
            .map(|raw| {
                let port = PortSpec::parse(raw);
                format!("* Listen on {} port {}", port.protocol(), port.host)
            })
            .collect(),
        StructChange::Modification { old, new, .. } => {
            let (old, new) = (old.to_string(), new.to_string());
            let (prev, curr) = (PortSpec::parse(&old), PortSpec::parse(&new));
            let mut line = String::from("* Listen on");
            if prev.udp == curr.udp {
                line.push(' ');
                line.push_str(curr.protocol());
            } else {
                let _ = write!(
                    line,
                    " changed from {} to {}",
                    prev.protocol(),
                    curr.protocol()
                );
            }
            if prev.host == curr.host {
                let _ = write!(line, " port {}", curr.host);
            } else {
                let _ = write!(line, " port changed from {} to {}", prev.host, curr.host);
            }
            vec![line]
        }
    }
}

/// What: Describe which host environment variables a package reads.
///
/// Inputs:
/// - `change`: Change of the `Environment` field.
///
/// Output:
/// - `* Read the environment variable <NAME>` per item; modifications name both variables.
#[must_use]
pub fn environment(change: &StructChange) -> Vec<String> {
    match change {
        StructChange::Addition { value, .. } | StructChange::Removal { value, .. } => value
            .items()
            .iter()
            .map(|name| format!("* Read the environment variable {name}"))
            .collect(),
        StructChange::Modification { old, new, .. } => vec![format!(
            "* Read the environment variable {new} instead of {old}"
        )],
    }
}

/// Host side of a bind mount parsed from `hostPath:containerPath[:ro]`.
struct MountSpec<'a> {
    host: &'a str,
    read_only: bool,
}

impl<'a> MountSpec<'a> {
    /// `None` for a bare volume name, which grants no host access.
    fn parse(raw: &'a str) -> Option<Self> {
        let mut parts = raw.split(':');
        let host = parts.next()?;
        let rest: Vec<&str> = parts.collect();
        if rest.is_empty() {
            return None;
        }
        let read_only = rest.len() >= 2
            && rest
                .last()
                .is_some_and(|opts| opts.split(',').any(|opt| opt == "ro"));
        Some(Self { host, read_only })
    }

    fn describe(&self) -> String {
        if self.read_only {
            format!("* Read the file or directory {:?}", self.host)
        } else {
            format!("* Read and write to the file or directory {:?}", self.host)
        }
    }
}

/// What: Describe which host paths a package can read or write.
///
/// Inputs:
/// - `change`: Change of the `Volumes` field.
///
/// Output:
/// - One line per bind mount; bare volume names produce no line.
///
/// Details:
/// - A modification reports access mode and host path changes separately.
/// - A modification with a bare volume name on one side renders nothing here;
///   [`volume_access_change`] turns it into the removal or addition it really is.
#[must_use]
pub fn volumes(change: &StructChange) -> Vec<String> {
    match change {
        StructChange::Addition { value, .. } | StructChange::Removal { value, .. } => value
            .items()
            .iter()
            .filter_map(|raw| MountSpec::parse(raw).map(|m| m.describe()))
            .collect(),
        StructChange::Modification { old, new, .. } => {
            let (old, new) = (old.to_string(), new.to_string());
            match (MountSpec::parse(&old), MountSpec::parse(&new)) {
                (Some(prev), Some(curr)) => vec![describe_mount_change(&prev, &curr)],
                _ => Vec::new(),
            }
        }
    }
}

/// What: Rewrite a volume modification where only one side is a bind mount.
///
/// Inputs:
/// - `change`: Change of the `Volumes` field.
///
/// Output:
/// - `Removal` of the old mount when the new side is a bare volume name,
///   `Addition` of the new mount when the old side is, `None` otherwise.
#[must_use]
pub fn volume_access_change(change: &StructChange) -> Option<StructChange> {
    let StructChange::Modification {
        field, old, new, ..
    } = change
    else {
        return None;
    };
    let (old_text, new_text) = (old.to_string(), new.to_string());
    match (MountSpec::parse(&old_text), MountSpec::parse(&new_text)) {
        (Some(_), None) => Some(StructChange::Removal {
            field: *field,
            value: old.clone(),
        }),
        (None, Some(_)) => Some(StructChange::Addition {
            field: *field,
            value: new.clone(),
        }),
        _ => None,
    }
}

fn describe_mount_change(prev: &MountSpec<'_>, curr: &MountSpec<'_>) -> String {
    let mut line = String::from(match (prev.read_only, curr.read_only) {
        (true, false) => "* Read changed to read and write of the file or directory",
        (false, true) => "* Read and write changed to read of the file or directory",
        (true, true) => "* Read the file or directory",
        (false, false) => "* Read and write to the file or directory",
    });
    if prev.host == curr.host {
        let _ = write!(line, " {:?}", curr.host);
    } else {
        let _ = write!(line, " changed from {:?} to {:?}", prev.host, curr.host);
    }
    line
}

/// What: Mapping from field name to renderer.
///
/// Details:
/// - Entries are kept in insertion order, which is the order permission
///   reports visit fields.
/// - Fields without an entry use the fallback, when one is set.
/// - Rewrites run before a change is assigned to a report section.
#[derive(Debug, Clone)]
pub struct FormatterRegistry {
    entries: Vec<(&'static str, Formatter)>,
    rewrites: Vec<(&'static str, Rewrite)>,
    fallback: Option<Formatter>,
}

impl FormatterRegistry {
    /// Raw-value rendering for every field.
    #[must_use]
    pub fn generic() -> Self {
        Self {
            entries: Vec::new(),
            rewrites: Vec::new(),
            fallback: Some(generic),
        }
    }

    /// Permission renderers for Environment, Ports and Volumes, generic for the rest.
    #[must_use]
    pub fn semantic() -> Self {
        Self {
            fallback: Some(generic),
            ..Self::permissions()
        }
    }

    /// Permission renderers only, in priority order, with no fallback.
    #[must_use]
    pub fn permissions() -> Self {
        Self {
            entries: vec![
                (ENVIRONMENT.name, environment as Formatter),
                (PORTS.name, ports as Formatter),
                (VOLUMES.name, volumes as Formatter),
            ],
            rewrites: vec![(VOLUMES.name, volume_access_change as Rewrite)],
            fallback: None,
        }
    }

    /// What: Find the renderer for a field.
    ///
    /// Inputs:
    /// - `field`: Field name.
    ///
    /// Output:
    /// - Field-specific renderer, else the fallback, else `None`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<Formatter> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, f)| *f)
            .or(self.fallback)
    }

    /// What: Apply the rewrite registered for the change's field.
    ///
    /// Output:
    /// - The rewritten change, or `None` when it should be rendered as is.
    #[must_use]
    pub fn rewrite(&self, change: &StructChange) -> Option<StructChange> {
        self.rewrites
            .iter()
            .find(|(name, _)| *name == change.field())
            .and_then(|(_, rewrite)| rewrite(change))
    }

    /// Field names with a dedicated renderer, in registration order.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::change::ChangeValue;
    use crate::diff::fields::FieldKind;

    fn added(field: &'static str, value: &str) -> StructChange {
        StructChange::Addition {
            field,
            value: ChangeValue::Text(value.to_string()),
        }
    }

    fn modified(field: &'static str, old: &str, new: &str) -> StructChange {
        StructChange::Modification {
            field,
            kind: FieldKind::List,
            old: ChangeValue::Text(old.to_string()),
            new: ChangeValue::Text(new.to_string()),
        }
    }

    #[test]
    /// What: Generic renderer prints markers and raw values
    ///
    /// - Input: Whole-list addition, scalar removal, modification
    /// - Output: One `+` line per element, one `-` line, one `>` line
    fn generic_lines() {
        let change = StructChange::Addition {
            field: "Networks",
            value: ChangeValue::List(vec!["front".into(), "back".into()]),
        };
        assert_eq!(generic(&change), vec!["+ front", "+ back"]);
        let change = StructChange::Removal {
            field: "KeepContainerUser",
            value: ChangeValue::Flag(true),
        };
        assert_eq!(generic(&change), vec!["- true"]);
        assert_eq!(
            generic(&modified("WorkingDir", "/a", "/b")),
            vec!["> /a to /b"]
        );
    }

    #[test]
    /// What: Port modifications describe protocol and number changes
    ///
    /// - Input: Protocol flip, number change, both, udp unchanged
    /// - Output: Matching sentences
    fn port_modifications() {
        assert_eq!(
            ports(&modified("Ports", "80:80", "80:80:udp")),
            vec!["* Listen on changed from TCP to UDP port 80"]
        );
        assert_eq!(
            ports(&modified("Ports", "80:80:udp", "8080:80")),
            vec!["* Listen on changed from UDP to TCP port changed from 80 to 8080"]
        );
        assert_eq!(
            ports(&modified("Ports", "80:80", "81:80")),
            vec!["* Listen on TCP port changed from 80 to 81"]
        );
        assert_eq!(
            ports(&modified("Ports", "53:53:udp", "53:5353:udp")),
            vec!["* Listen on UDP port 53"]
        );
    }

    #[test]
    /// What: Ports without a colon are echoed as-is
    ///
    /// - Input: `notaport`
    /// - Output: TCP lines with the raw text
    fn port_without_colon() {
        assert_eq!(
            ports(&added("Ports", "notaport")),
            vec!["* Listen on TCP port notaport"]
        );
    }

    #[test]
    /// What: Environment modification names the new and old variable
    ///
    /// - Input: `AWS_PROFILE` replaced by `AWS_SECRET_ACCESS_KEY`
    /// - Output: Single sentence with both names
    fn environment_modification() {
        assert_eq!(
            environment(&modified("Environment", "AWS_PROFILE", "AWS_SECRET_ACCESS_KEY")),
            vec!["* Read the environment variable AWS_SECRET_ACCESS_KEY instead of AWS_PROFILE"]
        );
    }

    #[test]
    /// What: Volume renderer skips bare names and reads the access mode
    ///
    /// - Input: Named volume, read-write mount, read-only mount, container path ending in "ro"
    /// - Output: Lines only for bind mounts, correct modes
    fn volume_additions() {
        let change = StructChange::Addition {
            field: "Volumes",
            value: ChangeValue::List(vec![
                "cache".into(),
                "/etc/passwd:/passwd".into(),
                "/etc/hosts:/hosts:ro".into(),
                "/srv:/micro".into(),
            ]),
        };
        assert_eq!(
            volumes(&change),
            vec![
                "* Read and write to the file or directory \"/etc/passwd\"",
                "* Read the file or directory \"/etc/hosts\"",
                "* Read and write to the file or directory \"/srv\"",
            ]
        );
    }

    #[test]
    /// What: Volume modifications combine access mode and path changes
    ///
    /// - Input: ro to rw on the same path, rw to ro with a new path, named to bind mount
    /// - Output: Matching sentences
    fn volume_modifications() {
        assert_eq!(
            volumes(&modified("Volumes", "/data:/data:ro", "/data:/data")),
            vec!["* Read changed to read and write of the file or directory \"/data\""]
        );
        assert_eq!(
            volumes(&modified("Volumes", "/a:/data", "/b:/data:ro")),
            vec![
                "* Read and write changed to read of the file or directory changed from \"/a\" to \"/b\""
            ]
        );
        assert!(volumes(&modified("Volumes", "cache", "/home:/data")).is_empty());
        assert!(volumes(&modified("Volumes", "/home:/data", "cache")).is_empty());
        assert!(volumes(&modified("Volumes", "cache", "other")).is_empty());
    }

    #[test]
    /// What: Swapping a bind mount for a named volume is a loss or gain of access
    ///
    /// - Input: Bind mount replaced by a named volume, and the reverse
    /// - Output: Removal of the old mount, Addition of the new one; registries apply it
    fn volume_access_rewrites() {
        assert_eq!(
            volume_access_change(&modified("Volumes", "/home:/data", "cache")),
            Some(StructChange::Removal {
                field: "Volumes",
                value: ChangeValue::Text("/home:/data".into()),
            })
        );
        let gained = modified("Volumes", "cache", "/home:/data:ro");
        assert_eq!(
            FormatterRegistry::permissions().rewrite(&gained),
            Some(StructChange::Addition {
                field: "Volumes",
                value: ChangeValue::Text("/home:/data:ro".into()),
            })
        );
        assert!(volume_access_change(&modified("Volumes", "/a:/a", "/b:/b")).is_none());
        assert!(FormatterRegistry::generic().rewrite(&gained).is_none());
    }

    #[test]
    /// What: Registries resolve renderers by field
    ///
    /// - Input: Lookups in the three registries
    /// - Output: Dedicated renderers, fallbacks, or `None` without fallback
    fn registry_lookup() {
        let permissions = FormatterRegistry::permissions();
        assert_eq!(
            permissions.fields().collect::<Vec<_>>(),
            vec!["Environment", "Ports", "Volumes"]
        );
        assert!(permissions.get("Image").is_none());
        let semantic = FormatterRegistry::semantic();
        let port = semantic.get("Ports").expect("ports renderer");
        assert_eq!(port(&added("Ports", "80:80")), vec!["* Listen on TCP port 80"]);
        let image = semantic.get("Image").expect("fallback renderer");
        assert_eq!(image(&added("Image", "alpine")), vec!["+ alpine"]);
        assert!(FormatterRegistry::generic().get("Ports").is_some());
    }
}
