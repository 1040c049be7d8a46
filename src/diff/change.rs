//! Change classification between two values of the same field.
//!
//! Scalars become a single addition, removal or modification. Lists are
//! aligned along their longest common subsequence so that only the elements
//! that actually moved are reported.

use std::collections::BTreeSet;
use std::fmt;

use similar::{Algorithm, DiffOp};

use super::fields::{FieldKind, FieldSpec, FieldValue};

/// What: Owned value carried by a change.
///
/// Details:
/// - `List` only appears when a whole list field went from empty to non-empty
///   (or back); element-level changes carry `Text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeValue {
    /// String scalar or a single list element.
    Text(String),
    /// Boolean scalar.
    Flag(bool),
    /// Entire list.
    List(Vec<String>),
}

impl ChangeValue {
    /// What: Split the value into the items a formatter renders one per line.
    ///
    /// Output:
    /// - Every element for a list, the value itself otherwise.
    #[must_use]
    pub fn items(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.clone(),
            Self::Text(_) | Self::Flag(_) => vec![self.to_string()],
        }
    }
}

impl fmt::Display for ChangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::List(items) => write!(f, "[{}]", items.join(" ")),
        }
    }
}

/// What: One classified difference at one field.
///
/// Inputs: Produced by [`classify`] while walking two package configurations.
///
/// Output: Consumed once by a report renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructChange {
    /// Value present in the new record and absent in the old one.
    Addition {
        /// Field name.
        field: &'static str,
        /// Added value.
        value: ChangeValue,
    },
    /// Value present in the old record and absent in the new one.
    Removal {
        /// Field name.
        field: &'static str,
        /// Removed value.
        value: ChangeValue,
    },
    /// Value present on both sides with different content.
    Modification {
        /// Field name.
        field: &'static str,
        /// Declared type of the field.
        kind: FieldKind,
        /// Previous value.
        old: ChangeValue,
        /// Current value.
        new: ChangeValue,
    },
}

impl StructChange {
    /// Name of the field this change belongs to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Addition { field, .. }
            | Self::Removal { field, .. }
            | Self::Modification { field, .. } => field,
        }
    }
}

/// What: Classify the difference between two values of one field.
///
/// Inputs:
/// - `spec`: Field being compared.
/// - `old`: Value in the previous record.
/// - `new`: Value in the candidate record.
///
/// Output:
/// - Zero or more changes; empty when both sides are equal.
///
/// # Panics
/// - Panics when either value does not have the field's declared kind. Both
///   records share one schema, so a mismatch is a bug in the field table and
///   must not be skipped.
#[must_use]
pub fn classify(spec: &FieldSpec, old: FieldValue<'_>, new: FieldValue<'_>) -> Vec<StructChange> {
    assert!(
        old.kind() == spec.kind && new.kind() == spec.kind,
        "field {} is declared {:?} but compared {:?} with {:?}",
        spec.name,
        spec.kind,
        old.kind(),
        new.kind()
    );
    match (old, new) {
        (FieldValue::Text(old), FieldValue::Text(new)) => classify_text(spec.name, old, new)
            .into_iter()
            .collect(),
        (FieldValue::Flag(old), FieldValue::Flag(new)) => classify_flag(spec.name, old, new)
            .into_iter()
            .collect(),
        (FieldValue::List(old), FieldValue::List(new)) => classify_list(spec.name, old, new),
        (old, new) => unreachable!(
            "field {} kinds checked above: {:?} / {:?}",
            spec.name,
            old.kind(),
            new.kind()
        ),
    }
}

/// Empty string is the zero value.
fn classify_text(field: &'static str, old: &str, new: &str) -> Option<StructChange> {
    if old == new {
        None
    } else if old.is_empty() {
        Some(StructChange::Addition {
            field,
            value: ChangeValue::Text(new.to_string()),
        })
    } else if new.is_empty() {
        Some(StructChange::Removal {
            field,
            value: ChangeValue::Text(old.to_string()),
        })
    } else {
        Some(StructChange::Modification {
            field,
            kind: FieldKind::Text,
            old: ChangeValue::Text(old.to_string()),
            new: ChangeValue::Text(new.to_string()),
        })
    }
}

/// `false` is the zero value, so a flag is only ever added or removed.
fn classify_flag(field: &'static str, old: bool, new: bool) -> Option<StructChange> {
    match (old, new) {
        (false, true) => Some(StructChange::Addition {
            field,
            value: ChangeValue::Flag(true),
        }),
        (true, false) => Some(StructChange::Removal {
            field,
            value: ChangeValue::Flag(true),
        }),
        _ => None,
    }
}

/// What: Classify the difference between two ordered lists.
///
/// Inputs:
/// - `field`: Field name.
/// - `old`: Previous list.
/// - `new`: Candidate list.
///
/// Output:
/// - One change per altered element, or a single whole-list change when one side is empty.
///
/// Details:
/// - Lists holding the same set of elements are considered equal, whatever
///   their order or repetitions.
/// - Within a run of unmatched elements, a removed and an added element sitting
///   at the same index are reported as one modification.
fn classify_list(field: &'static str, old: &[String], new: &[String]) -> Vec<StructChange> {
    match (old.is_empty(), new.is_empty()) {
        (true, true) => return Vec::new(),
        (true, false) => {
            return vec![StructChange::Addition {
                field,
                value: ChangeValue::List(new.to_vec()),
            }];
        }
        (false, true) => {
            return vec![StructChange::Removal {
                field,
                value: ChangeValue::List(old.to_vec()),
            }];
        }
        (false, false) => {}
    }
    if same_elements(old, new) {
        return Vec::new();
    }

    let mut changes = Vec::new();
    let mut removed = Vec::new();
    let mut added = Vec::new();
    for op in similar::capture_diff_slices(Algorithm::Lcs, old, new) {
        match op {
            DiffOp::Equal { .. } => {
                flush_run(field, old, new, &mut removed, &mut added, &mut changes);
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => removed.extend(old_index..old_index + old_len),
            DiffOp::Insert {
                new_index, new_len, ..
            } => added.extend(new_index..new_index + new_len),
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                removed.extend(old_index..old_index + old_len);
                added.extend(new_index..new_index + new_len);
            }
        }
    }
    flush_run(field, old, new, &mut removed, &mut added, &mut changes);
    changes
}

/// Set equality: order and repeated entries do not make a list change.
fn same_elements(old: &[String], new: &[String]) -> bool {
    old.iter().collect::<BTreeSet<_>>() == new.iter().collect::<BTreeSet<_>>()
}

/// Turn one run of unmatched indices into changes, then clear it.
///
/// The k-th removed and k-th added element of a run form a modification only
/// when they sit at the same index; otherwise both are reported.
fn flush_run(
    field: &'static str,
    old: &[String],
    new: &[String],
    removed: &mut Vec<usize>,
    added: &mut Vec<usize>,
    changes: &mut Vec<StructChange>,
) {
    for k in 0..removed.len().max(added.len()) {
        match (removed.get(k).copied(), added.get(k).copied()) {
            (Some(i), Some(j)) if i == j => changes.push(StructChange::Modification {
                field,
                kind: FieldKind::List,
                old: ChangeValue::Text(old[i].clone()),
                new: ChangeValue::Text(new[j].clone()),
            }),
            (i, j) => {
                if let Some(i) = i {
                    changes.push(StructChange::Removal {
                        field,
                        value: ChangeValue::Text(old[i].clone()),
                    });
                }
                if let Some(j) = j {
                    changes.push(StructChange::Addition {
                        field,
                        value: ChangeValue::Text(new[j].clone()),
                    });
                }
            }
        }
    }
    removed.clear();
    added.clear();
}
